// ==========================================
// 推广员佣金结算引擎 - 配置层
// ==========================================
// 职责: 引擎配置读取、币种精度、模板 + 覆写解析
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod currency;
pub mod settings_reader;
pub mod template_resolver;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use currency::{MinorUnitTable, DEFAULT_MINOR_UNITS};
pub use settings_reader::CommissionSettingsReader;
pub use template_resolver::TemplateResolver;
