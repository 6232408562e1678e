// ==========================================
// 佣金配置构建器 - 用于集成测试
// ==========================================

use chrono::{TimeZone, Utc};
use promoter_commission::domain::commission::{
    BonusTier, CommissionConfig, CommissionTemplate, FixedFeeRule, PerHeadRule, SimpleBonus,
    TableCommissionRule,
};
use promoter_commission::domain::types::{CountBasis, TableCommissionBase, TableCommissionMode};
use rust_decimal::Decimal;

pub struct ConfigBuilder {
    config: CommissionConfig,
}

impl ConfigBuilder {
    pub fn new(id: &str, currency: &str) -> Self {
        Self {
            config: CommissionConfig::empty(id, currency),
        }
    }

    pub fn idr(id: &str) -> Self {
        Self::new(id, "IDR")
    }

    pub fn count_basis(mut self, basis: CountBasis) -> Self {
        self.config.count_basis = basis;
        self
    }

    pub fn per_head(mut self, rate: Decimal, min_guests: Option<u32>, max_guests: Option<u32>) -> Self {
        self.config.per_head = Some(PerHeadRule {
            rate,
            min_guests,
            max_guests,
        });
        self
    }

    pub fn fixed_fee(mut self, amount: Decimal, minimum_guests: u32, below_minimum_percent: Decimal) -> Self {
        self.config.fixed_fee = Some(FixedFeeRule {
            amount,
            minimum_guests: Some(minimum_guests),
            below_minimum_percent: Some(below_minimum_percent),
        });
        self
    }

    pub fn simple_bonus(mut self, threshold: i64, amount: Decimal) -> Self {
        self.config.simple_bonus = Some(SimpleBonus { threshold, amount });
        self
    }

    pub fn tier(mut self, threshold: i64, amount: Decimal, repeatable: bool) -> Self {
        self.config.bonus_tiers.push(BonusTier {
            threshold,
            amount,
            repeatable,
            label: None,
        });
        self
    }

    pub fn table_percentage(mut self, rate: Decimal) -> Self {
        self.config.table_commission = Some(TableCommissionRule {
            mode: TableCommissionMode::Percentage,
            rate: Some(rate),
            flat_fee: None,
            base: TableCommissionBase::Revenue,
        });
        self
    }

    pub fn table_flat_fee(mut self, flat_fee: Decimal) -> Self {
        self.config.table_commission = Some(TableCommissionRule {
            mode: TableCommissionMode::FlatFee,
            rate: None,
            flat_fee: Some(flat_fee),
            base: TableCommissionBase::Revenue,
        });
        self
    }

    pub fn build(self) -> CommissionConfig {
        self.config
    }

    /// 以配置 id 作为模板 id 生成模板
    pub fn template(self, name: &str) -> CommissionTemplate {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        CommissionTemplate {
            template_id: self.config.id.clone(),
            name: name.to_string(),
            description: None,
            config: self.config,
            created_at: at,
            updated_at: at,
        }
    }
}
