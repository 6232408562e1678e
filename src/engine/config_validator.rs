// ==========================================
// 推广员佣金结算引擎 - 佣金配置校验器
// ==========================================
// 职责: 计算前 / 模板保存前的结构校验
// 红线: 缺失必填子字段直接报错，不按 0 处理
// 输出: 首个问题（字段路径 + 原因）
// ==========================================

use crate::domain::commission::{BonusTier, CommissionConfig};
use crate::domain::types::TableCommissionMode;
use crate::engine::error::{CommissionError, CommissionResult};
use rust_decimal::Decimal;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn new() -> Self {
        Self
    }

    /// 校验完整配置
    pub fn validate(&self, config: &CommissionConfig) -> CommissionResult<()> {
        let id = config.id.as_str();

        self.validate_currency(config)?;

        if let Some(per_head) = &config.per_head {
            non_negative(id, "perHead.rate", per_head.rate)?;
            if let (Some(min), Some(max)) = (per_head.min_guests, per_head.max_guests) {
                if min > max {
                    return Err(CommissionError::configuration(
                        id,
                        "perHead.maxGuests",
                        format!("maxGuests={} 小于 minGuests={}", max, min),
                    ));
                }
            }
        }

        if let Some(fixed) = &config.fixed_fee {
            non_negative(id, "fixedFee.amount", fixed.amount)?;
            if let Some(pct) = fixed.below_minimum_percent {
                if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
                    return Err(CommissionError::configuration(
                        id,
                        "fixedFee.belowMinimumPercent",
                        format!("{} 超出范围 [0, 100]", pct),
                    ));
                }
            }
        }

        if let Some(simple) = &config.simple_bonus {
            if simple.threshold <= 0 {
                return Err(CommissionError::configuration(
                    id,
                    "simpleBonus.threshold",
                    format!("threshold={} 必须大于 0", simple.threshold),
                ));
            }
            non_negative(id, "simpleBonus.amount", simple.amount)?;
        }

        if let Some(table) = &config.table_commission {
            match table.mode {
                TableCommissionMode::Percentage => {
                    let rate = table.rate.ok_or_else(|| {
                        CommissionError::configuration(
                            id,
                            "tableCommission.rate",
                            "percentage 模式必须配置 rate",
                        )
                    })?;
                    non_negative(id, "tableCommission.rate", rate)?;
                }
                TableCommissionMode::FlatFee => {
                    let fee = table.flat_fee.ok_or_else(|| {
                        CommissionError::configuration(
                            id,
                            "tableCommission.flatFee",
                            "flat_fee 模式必须配置 flatFee",
                        )
                    })?;
                    non_negative(id, "tableCommission.flatFee", fee)?;
                }
            }
        }

        self.effective_tiers(config)?;
        Ok(())
    }

    /// 返回过滤占位行后的有效档位
    ///
    /// - threshold=0 且 amount=0 的行为空白占位，直接过滤
    /// - 其他 threshold<=0 或 amount<0 → InvalidTier
    /// - 同 threshold 的非重复档重复出现 → InvalidTier
    pub fn effective_tiers(&self, config: &CommissionConfig) -> CommissionResult<Vec<BonusTier>> {
        let mut seen_milestones: HashSet<i64> = HashSet::new();
        let mut tiers = Vec::with_capacity(config.bonus_tiers.len());

        for (index, tier) in config.bonus_tiers.iter().enumerate() {
            if tier.threshold == 0 && tier.amount.is_zero() {
                continue;
            }

            let invalid = |message: String| CommissionError::InvalidTier {
                config_id: config.id.clone(),
                index,
                threshold: tier.threshold,
                amount: tier.amount,
                message,
            };

            if tier.threshold <= 0 {
                return Err(invalid("threshold 必须大于 0".to_string()));
            }
            if tier.amount < Decimal::ZERO {
                return Err(invalid("amount 不能为负数".to_string()));
            }
            if !tier.repeatable && !seen_milestones.insert(tier.threshold) {
                return Err(invalid(format!(
                    "threshold={} 存在重复的非重复档位",
                    tier.threshold
                )));
            }

            tiers.push(tier.clone());
        }

        Ok(tiers)
    }

    fn validate_currency(&self, config: &CommissionConfig) -> CommissionResult<()> {
        let code = config.currency.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CommissionError::configuration(
                &config.id,
                "currency",
                format!("币种代码无效: '{}'", config.currency),
            ));
        }
        Ok(())
    }
}

fn non_negative(config_id: &str, field: &str, value: Decimal) -> CommissionResult<()> {
    if value < Decimal::ZERO {
        return Err(CommissionError::configuration(
            config_id,
            field,
            format!("{} 不能为负数", value),
        ));
    }
    Ok(())
}
