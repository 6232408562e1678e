// ==========================================
// 推广员佣金结算引擎 - 阶梯奖励评估器
// ==========================================
// 职责: 按人数评估阶梯奖励档位
// 规则: 1) 按 threshold 升序评估（不信任输入顺序）
//       2) 非重复档: 达标支付一次
//       3) 重复档: 每满 threshold 人支付一次
//       4) 多档可同时命中，全部累加（不取最优单档）
// ==========================================

use crate::domain::commission::BonusTier;
use crate::domain::payout::BonusEntry;
use crate::engine::error::{CommissionError, CommissionResult};
use rust_decimal::Decimal;

// ==========================================
// TierEvaluator - 阶梯奖励评估器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct TierEvaluator;

impl TierEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// 评估所有档位，返回命中档位的明细（threshold 升序）
    ///
    /// threshold <= 0 的档位视为无效并跳过；校验由 ConfigValidator 在此之前完成
    pub fn evaluate(
        &self,
        tiers: &[BonusTier],
        guest_count: u32,
    ) -> CommissionResult<Vec<BonusEntry>> {
        let mut ordered: Vec<&BonusTier> = tiers.iter().filter(|t| t.threshold > 0).collect();
        // 稳定排序: 同 threshold 保持输入顺序
        ordered.sort_by_key(|t| t.threshold);

        let guests = i64::from(guest_count);
        ordered
            .into_iter()
            .filter(|tier| guests >= tier.threshold)
            .map(|tier| -> CommissionResult<BonusEntry> {
                if tier.repeatable {
                    let blocks = guests / tier.threshold;
                    let amount = tier.amount.checked_mul(Decimal::from(blocks)).ok_or_else(|| {
                        CommissionError::overflow(
                            "bonusTiers",
                            format!("amount={} x blocks={}", tier.amount, blocks),
                        )
                    })?;
                    Ok(BonusEntry {
                        label: tier_label(tier, Some(blocks)),
                        amount,
                    })
                } else {
                    Ok(BonusEntry {
                        label: tier_label(tier, None),
                        amount: tier.amount,
                    })
                }
            })
            .collect()
    }

    /// 命中档位金额合计
    pub fn total(&self, tiers: &[BonusTier], guest_count: u32) -> CommissionResult<Decimal> {
        sum_entries(&self.evaluate(tiers, guest_count)?)
    }
}

/// 明细金额合计（溢出报错）
pub(crate) fn sum_entries(entries: &[BonusEntry]) -> CommissionResult<Decimal> {
    entries.iter().try_fold(Decimal::ZERO, |acc, e| {
        acc.checked_add(e.amount)
            .ok_or_else(|| CommissionError::overflow("bonus", format!("{} + {}", acc, e.amount)))
    })
}

fn tier_label(tier: &BonusTier, blocks: Option<i64>) -> String {
    if let Some(label) = tier.label.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        return label.to_string();
    }
    match blocks {
        Some(n) => format!("{} x {} guests", n, tier.threshold),
        None => format!("{}+ guests", tier.threshold),
    }
}
