// ==========================================
// 推广员佣金结算引擎 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 推广员归因 + 佣金计算 + 结算汇总
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 规则与结果类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 归因/计算/汇总
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CountBasis, GroupBy, TableCommissionBase, TableCommissionMode};

// 领域实体
pub use domain::{
    AggregateRow, BonusTier, CommissionConfig, CommissionOverride, CommissionTemplate,
    EventActivity, EventPayoutReport, EventPromoterAssignment, PayoutResult, Promoter,
    Registration, TableBooking,
};

// 引擎
pub use engine::{
    Aggregator, AttributionResolver, CommissionCalculator, CommissionError, PayoutRunner,
    TierEvaluator,
};

// API
pub use api::{ApiError, PayoutApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "推广员佣金结算引擎";
