// ==========================================
// 推广员佣金结算引擎 - 结算结果模型
// ==========================================
// 职责: 单推广员单活动的佣金结果 + 汇总报表行
// 红线: total = 四项之和，仅在最终求和时舍入一次
// ==========================================

use crate::domain::types::CountBasis;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 奖励明细条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusEntry {
    pub label: String,
    pub amount: Decimal,
}

// ==========================================
// PayoutResult - 佣金结算结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutResult {
    pub promoter_id: String,
    pub event_id: String,
    pub config_id: String,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,

    // ===== 计费依据 =====
    pub count_basis: CountBasis,
    pub guest_count: u32, // 实际参与计费的人数（按 count_basis）
    pub checked_in_count: u32,
    pub table_booking_count: u32,

    // ===== 各组成部分（全精度，未舍入）=====
    pub per_head_amount: Decimal,
    pub fixed_fee_amount: Decimal,
    pub bonus_amount: Decimal,
    pub bonus_breakdown: Vec<BonusEntry>,
    pub table_commission_amount: Decimal,

    // ===== 合计（按币种最小单位舍入）=====
    pub total: Decimal,
    pub currency: String,
}

impl PayoutResult {
    /// 四项之和（未舍入），溢出时为 None
    pub fn component_sum(&self) -> Option<Decimal> {
        self.per_head_amount
            .checked_add(self.fixed_fee_amount)?
            .checked_add(self.bonus_amount)?
            .checked_add(self.table_commission_amount)
    }
}

// ==========================================
// AggregateRow - 汇总报表行
// ==========================================
// 不同币种分桶累计，不做汇率换算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow {
    pub group_key: String,
    pub totals_by_currency: BTreeMap<String, Decimal>,
    pub event_count: usize,
    pub result_count: usize,
}

// ==========================================
// EventPayoutReport - 单场活动结算报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayoutReport {
    pub run_id: String,
    pub event_id: String,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    pub results: Vec<PayoutResult>,
    /// 有归因但未分配佣金配置的推广员
    pub unassigned_promoters: Vec<String>,
}
