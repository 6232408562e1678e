// ==========================================
// 推广员佣金结算引擎 - 佣金规则模型
// ==========================================
// 职责: 描述一套佣金配置（纯数据，不含计算逻辑）
// 说明: 各组成部分独立可选，可任意组合
//       （人头费 + 订台佣金 可同时生效）
// ==========================================

use crate::domain::types::{CountBasis, TableCommissionBase, TableCommissionMode};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// CommissionConfig - 佣金配置
// ==========================================
// 可以是保存的模板，也可以是分配时的内联覆写结果
// 所有金额字段以 currency 计价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionConfig {
    pub id: String,
    pub currency: String,

    /// 人数口径（默认按登记人数）
    #[serde(default)]
    pub count_basis: CountBasis,

    #[serde(default)]
    pub per_head: Option<PerHeadRule>,

    #[serde(default)]
    pub fixed_fee: Option<FixedFeeRule>,

    /// 单档奖励；与 bonus_tiers 同时存在时被忽略
    #[serde(default)]
    pub simple_bonus: Option<SimpleBonus>,

    #[serde(default)]
    pub bonus_tiers: Vec<BonusTier>,

    #[serde(default)]
    pub table_commission: Option<TableCommissionRule>,
}

impl CommissionConfig {
    /// 创建一个不含任何组成部分的空配置
    pub fn empty(id: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            currency: currency.into(),
            count_basis: CountBasis::default(),
            per_head: None,
            fixed_fee: None,
            simple_bonus: None,
            bonus_tiers: Vec::new(),
            table_commission: None,
        }
    }
}

/// 人头费: rate × clamp(人数, min_guests, max_guests)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerHeadRule {
    pub rate: Decimal,
    #[serde(default)]
    pub min_guests: Option<u32>, // 保底人数（按保底计费，不是门槛）
    #[serde(default)]
    pub max_guests: Option<u32>, // 封顶人数
}

/// 固定费: 未达最低人数时按比例扣减
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedFeeRule {
    pub amount: Decimal,
    #[serde(default)]
    pub minimum_guests: Option<u32>,
    /// 未达标时支付比例 (0..=100)，缺省为 100（不扣减）
    #[serde(default)]
    pub below_minimum_percent: Option<Decimal>,
}

/// 单档奖励: 达到 threshold 一次性支付 amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleBonus {
    pub threshold: i64,
    pub amount: Decimal,
}

/// 阶梯奖励档位
///
/// repeatable=true 时每满 threshold 人支付一次 amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusTier {
    pub threshold: i64,
    pub amount: Decimal,
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default)]
    pub label: Option<String>,
}

/// 订台佣金
///
/// 必填子字段随 mode 变化: Percentage → rate, FlatFee → flat_fee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCommissionRule {
    pub mode: TableCommissionMode,
    #[serde(default)]
    pub rate: Option<Decimal>, // 百分比，10 表示 10%
    #[serde(default)]
    pub flat_fee: Option<Decimal>,
    #[serde(default)]
    pub base: TableCommissionBase,
}

// ==========================================
// CommissionTemplate - 佣金模板（持久化对象）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionTemplate {
    pub template_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub config: CommissionConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// CommissionOverride - 分配级覆写
// ==========================================
// 出现的字段整体替换模板对应字段（不做字段级合并）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionOverride {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub count_basis: Option<CountBasis>,
    #[serde(default)]
    pub per_head: Option<PerHeadRule>,
    #[serde(default)]
    pub fixed_fee: Option<FixedFeeRule>,
    #[serde(default)]
    pub simple_bonus: Option<SimpleBonus>,
    #[serde(default)]
    pub bonus_tiers: Option<Vec<BonusTier>>,
    #[serde(default)]
    pub table_commission: Option<TableCommissionRule>,
}

impl CommissionOverride {
    /// 是否没有任何覆写字段（空档位列表不算覆写）
    pub fn is_empty(&self) -> bool {
        self.currency.is_none()
            && self.count_basis.is_none()
            && self.per_head.is_none()
            && self.fixed_fee.is_none()
            && self.simple_bonus.is_none()
            && self.bonus_tiers.as_ref().map_or(true, Vec::is_empty)
            && self.table_commission.is_none()
    }
}

// ==========================================
// EventPromoterAssignment - 活动-推广员分配
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPromoterAssignment {
    pub event_id: String,
    pub promoter_id: String,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default, rename = "override")]
    pub override_config: Option<CommissionOverride>,
}
