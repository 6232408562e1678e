// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use promoter_commission::config::CommissionSettingsReader;
use promoter_commission::repository::RepositoryResult;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct MockSettings {
    pub minor_units: HashMap<String, u32>,
    pub fail_on_unassigned: bool,
}

impl MockSettings {
    /// IDR 按整数结算
    pub fn idr_whole() -> Self {
        let mut settings = Self::default();
        settings.minor_units.insert("IDR".to_string(), 0);
        settings
    }

    pub fn strict() -> Self {
        Self {
            fail_on_unassigned: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl CommissionSettingsReader for MockSettings {
    async fn get_minor_unit_overrides(&self) -> RepositoryResult<HashMap<String, u32>> {
        Ok(self.minor_units.clone())
    }

    async fn get_fail_on_unassigned(&self) -> RepositoryResult<bool> {
        Ok(self.fail_on_unassigned)
    }
}
