// ==========================================
// 推广员佣金结算引擎 - 结算配置读取 Trait
// ==========================================
// 职责: 定义结算流程所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::currency::MinorUnitTable;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::collections::HashMap;

// ==========================================
// CommissionSettingsReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait CommissionSettingsReader: Send + Sync {
    /// 币种最小单位覆写
    ///
    /// # 返回
    /// - HashMap<String, u32>: 币种代码（大写）→ 小数位数
    ///
    /// # 默认值
    /// - 空（全部使用 ISO 4217 内置表）
    async fn get_minor_unit_overrides(&self) -> RepositoryResult<HashMap<String, u32>>;

    /// 有归因但未分配配置的推广员是否使结算失败
    ///
    /// # 默认值
    /// - false（仅列入 unassigned_promoters）
    ///
    /// # 错误
    /// - 值无法识别为布尔值: FieldValueError
    async fn get_fail_on_unassigned(&self) -> RepositoryResult<bool>;

    /// 内置 ISO 表 + 覆写
    async fn get_minor_unit_table(&self) -> RepositoryResult<MinorUnitTable> {
        Ok(MinorUnitTable::with_overrides(
            self.get_minor_unit_overrides().await?,
        ))
    }
}
