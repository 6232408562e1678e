// ==========================================
// 推广员佣金结算引擎 - 佣金计算器
// ==========================================
// 职责: 组合 人头费 + 固定费 + 奖励 + 订台佣金 → 单推广员单活动结算
// 输入: CommissionConfig + AttributionInput
// 输出: PayoutResult
// 红线: 1) 配置缺失必填字段直接报错
//       2) 中间结果全精度，仅合计舍入一次（四舍五入到币种最小单位）
//       3) 金额溢出返回 AmountOverflow
// ==========================================

use crate::config::currency::MinorUnitTable;
use crate::domain::attribution::{AttributedBooking, AttributionInput};
use crate::domain::commission::{
    BonusTier, CommissionConfig, FixedFeeRule, PerHeadRule, TableCommissionRule,
};
use crate::domain::payout::{BonusEntry, PayoutResult};
use crate::domain::types::{CountBasis, TableCommissionBase, TableCommissionMode};
use crate::engine::config_validator::ConfigValidator;
use crate::engine::error::{CommissionError, CommissionResult};
use crate::engine::tier_evaluator::{sum_entries, TierEvaluator};
use rust_decimal::prelude::*;
use tracing::{debug, instrument, warn};

// ==========================================
// CommissionCalculator - 佣金计算器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CommissionCalculator {
    minor_units: MinorUnitTable,
    validator: ConfigValidator,
    tier_evaluator: TierEvaluator,
}

impl CommissionCalculator {
    /// 使用内置 ISO 币种精度
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用指定币种精度表（含配置覆写）
    pub fn with_minor_units(minor_units: MinorUnitTable) -> Self {
        Self {
            minor_units,
            ..Self::default()
        }
    }

    pub fn minor_units(&self) -> &MinorUnitTable {
        &self.minor_units
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算单推广员单活动的佣金
    ///
    /// 每次调用都会先校验配置，绕过保存校验的模板同样无法产生结算
    #[instrument(skip(self, config, input), fields(
        config_id = %config.id,
        event_id = %input.event_id,
        promoter_id = %input.promoter_id
    ))]
    pub fn calculate(
        &self,
        config: &CommissionConfig,
        input: &AttributionInput,
    ) -> CommissionResult<PayoutResult> {
        self.validator.validate(config)?;
        let tiers = self.validator.effective_tiers(config)?;

        let guests = Self::billable_guests(config.count_basis, input);

        // 1. 人头费
        let per_head_amount = match &config.per_head {
            Some(rule) => self.per_head_amount(rule, guests)?,
            None => Decimal::ZERO,
        };

        // 2. 固定费
        let fixed_fee_amount = match &config.fixed_fee {
            Some(rule) => self.fixed_fee_amount(rule, guests)?,
            None => Decimal::ZERO,
        };

        // 3. 奖励
        let bonus_breakdown = self.bonus_entries(config, &tiers, guests)?;
        let bonus_amount = sum_entries(&bonus_breakdown)?;

        // 4. 订台佣金
        let table_commission_amount = match &config.table_commission {
            Some(rule) => self.table_commission_amount(&config.id, rule, &input.table_bookings)?,
            None => Decimal::ZERO,
        };

        // 5. 合计（唯一一次舍入）
        let raw_total = [fixed_fee_amount, bonus_amount, table_commission_amount]
            .into_iter()
            .try_fold(per_head_amount, |acc, amount| acc.checked_add(amount))
            .ok_or_else(|| {
                CommissionError::overflow("total", format!("config={}", config.id))
            })?;
        let total = self.round_to_minor_unit(raw_total, &config.currency);

        debug!(
            guests,
            %per_head_amount,
            %fixed_fee_amount,
            %bonus_amount,
            %table_commission_amount,
            %total,
            "佣金计算完成"
        );

        Ok(PayoutResult {
            promoter_id: input.promoter_id.clone(),
            event_id: input.event_id.clone(),
            config_id: config.id.clone(),
            event_date: None,
            count_basis: config.count_basis,
            guest_count: guests,
            checked_in_count: input.checked_in_count,
            table_booking_count: input.table_bookings.len() as u32,
            per_head_amount,
            fixed_fee_amount,
            bonus_amount,
            bonus_breakdown,
            table_commission_amount,
            total,
            currency: config.currency.trim().to_uppercase(),
        })
    }

    // ==========================================
    // 组成部分
    // ==========================================

    /// 按人数口径取计费人数
    pub fn billable_guests(basis: CountBasis, input: &AttributionInput) -> u32 {
        match basis {
            CountBasis::Registered => input.guest_count,
            CountBasis::CheckedIn => input.checked_in_count,
        }
    }

    /// 人头费: rate × clamp(guests, min_guests, max_guests)
    ///
    /// min_guests 是保底人数：不足时按保底人数计费
    pub fn per_head_amount(&self, rule: &PerHeadRule, guests: u32) -> CommissionResult<Decimal> {
        let mut billable = guests.max(rule.min_guests.unwrap_or(0));
        if let Some(max) = rule.max_guests {
            billable = billable.min(max);
        }
        rule.rate.checked_mul(Decimal::from(billable)).ok_or_else(|| {
            CommissionError::overflow(
                "perHead",
                format!("rate={} x guests={}", rule.rate, billable),
            )
        })
    }

    /// 固定费: 未达最低人数时按 below_minimum_percent 线性扣减整笔费用
    pub fn fixed_fee_amount(&self, rule: &FixedFeeRule, guests: u32) -> CommissionResult<Decimal> {
        match rule.minimum_guests {
            Some(minimum) if guests < minimum => {
                let pct = rule.below_minimum_percent.unwrap_or(Decimal::ONE_HUNDRED);
                rule.amount
                    .checked_mul(pct)
                    .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
                    .ok_or_else(|| {
                        CommissionError::overflow(
                            "fixedFee",
                            format!("amount={} x {}%", rule.amount, pct),
                        )
                    })
            }
            _ => Ok(rule.amount),
        }
    }

    /// 奖励明细
    ///
    /// 阶梯档位存在时单档奖励被忽略
    pub fn bonus_entries(
        &self,
        config: &CommissionConfig,
        tiers: &[BonusTier],
        guests: u32,
    ) -> CommissionResult<Vec<BonusEntry>> {
        if !tiers.is_empty() {
            if config.simple_bonus.is_some() {
                warn!(config_id = %config.id, "同时配置了单档奖励与阶梯奖励，单档奖励被忽略");
            }
            return self.tier_evaluator.evaluate(tiers, guests);
        }

        Ok(match &config.simple_bonus {
            Some(simple) if i64::from(guests) >= simple.threshold => vec![BonusEntry {
                label: format!("{}+ guests", simple.threshold),
                amount: simple.amount,
            }],
            _ => Vec::new(),
        })
    }

    /// 订台佣金
    ///
    /// - Percentage: Σ booking.base × rate / 100
    /// - FlatFee: 每张订台 flat_fee
    pub fn table_commission_amount(
        &self,
        config_id: &str,
        rule: &TableCommissionRule,
        bookings: &[AttributedBooking],
    ) -> CommissionResult<Decimal> {
        let overflow = || {
            CommissionError::overflow("tableCommission", format!("config={}", config_id))
        };

        match rule.mode {
            TableCommissionMode::Percentage => {
                let rate = rule.rate.ok_or_else(|| {
                    CommissionError::configuration(
                        config_id,
                        "tableCommission.rate",
                        "percentage 模式必须配置 rate",
                    )
                })?;
                let base = bookings
                    .iter()
                    .map(|b| match rule.base {
                        TableCommissionBase::Revenue => b.revenue,
                        TableCommissionBase::Deposit => b.deposit,
                    })
                    .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
                    .ok_or_else(overflow)?;
                base.checked_mul(rate)
                    .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
                    .ok_or_else(overflow)
            }
            TableCommissionMode::FlatFee => {
                let fee = rule.flat_fee.ok_or_else(|| {
                    CommissionError::configuration(
                        config_id,
                        "tableCommission.flatFee",
                        "flat_fee 模式必须配置 flatFee",
                    )
                })?;
                fee.checked_mul(Decimal::from(bookings.len()))
                    .ok_or_else(overflow)
            }
        }
    }

    /// 舍入到币种最小单位（半数远离零，非负金额即四舍五入）
    pub fn round_to_minor_unit(&self, amount: Decimal, currency: &str) -> Decimal {
        let digits = self.minor_units.minor_units(currency);
        amount.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
    }
}
