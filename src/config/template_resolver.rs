// ==========================================
// 推广员佣金结算引擎 - 模板解析器
// ==========================================
// 职责: 模板 + 分配级覆写 → 生效的 CommissionConfig
// 规则: 覆写中出现的字段整体替换模板字段，不做字段级合并
//       bonusTiers 仅非空列表替换模板档位
// ==========================================

use crate::domain::commission::{CommissionConfig, CommissionOverride, CommissionTemplate};
use crate::engine::error::{CommissionError, CommissionResult};

#[derive(Debug, Clone, Default)]
pub struct TemplateResolver;

impl TemplateResolver {
    pub fn new() -> Self {
        Self
    }

    /// 解析生效配置
    ///
    /// # 参数
    /// - template: 分配引用的模板（可选）
    /// - override_config: 分配级覆写（可选）
    /// - event_id / promoter_id: 用于生成覆写后配置的 id
    ///
    /// # 返回
    /// - 无覆写: 模板配置原样返回（id 为模板 id）
    /// - 有覆写: id 为 "{event_id}/{promoter_id}"
    /// - 两者皆无，或仅覆写但缺 currency: 配置错误
    pub fn resolve(
        &self,
        template: Option<&CommissionTemplate>,
        override_config: Option<&CommissionOverride>,
        event_id: &str,
        promoter_id: &str,
    ) -> CommissionResult<CommissionConfig> {
        let assignment_key = format!("{}/{}", event_id, promoter_id);
        let active_override = override_config.filter(|o| !o.is_empty());

        let mut config = match (template, active_override) {
            (Some(t), None) => return Ok(t.config.clone()),
            (Some(t), Some(_)) => t.config.clone(),
            (None, Some(o)) => {
                let currency = o.currency.clone().ok_or_else(|| {
                    CommissionError::configuration(
                        &assignment_key,
                        "currency",
                        "无模板的覆写配置必须指定 currency",
                    )
                })?;
                CommissionConfig::empty(assignment_key.clone(), currency)
            }
            (None, None) => {
                return Err(CommissionError::configuration(
                    &assignment_key,
                    "templateId",
                    "分配既未引用模板也未提供覆写",
                ))
            }
        };

        if let Some(o) = active_override {
            apply_override(&mut config, o);
        }
        config.id = assignment_key;
        Ok(config)
    }
}

fn apply_override(config: &mut CommissionConfig, o: &CommissionOverride) {
    if let Some(currency) = &o.currency {
        config.currency = currency.clone();
    }
    if let Some(basis) = o.count_basis {
        config.count_basis = basis;
    }
    if let Some(per_head) = &o.per_head {
        config.per_head = Some(per_head.clone());
    }
    if let Some(fixed_fee) = &o.fixed_fee {
        config.fixed_fee = Some(fixed_fee.clone());
    }
    if let Some(simple) = &o.simple_bonus {
        config.simple_bonus = Some(simple.clone());
    }
    if let Some(tiers) = o.bonus_tiers.as_ref().filter(|t| !t.is_empty()) {
        config.bonus_tiers = tiers.clone();
    }
    if let Some(table) = &o.table_commission {
        config.table_commission = Some(table.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commission::{BonusTier, FixedFeeRule, PerHeadRule};
    use crate::domain::types::CountBasis;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn template() -> CommissionTemplate {
        let mut config = CommissionConfig::empty("TPL-1", "IDR");
        config.per_head = Some(PerHeadRule {
            rate: dec!(50000),
            min_guests: Some(5),
            max_guests: Some(100),
        });
        config.fixed_fee = Some(FixedFeeRule {
            amount: dec!(1000000),
            minimum_guests: None,
            below_minimum_percent: None,
        });
        config.bonus_tiers = vec![
            BonusTier {
                threshold: 20,
                amount: dec!(200000),
                repeatable: false,
                label: None,
            },
            BonusTier {
                threshold: 50,
                amount: dec!(500000),
                repeatable: false,
                label: None,
            },
        ];

        CommissionTemplate {
            template_id: "TPL-1".to_string(),
            name: "Weekend standard".to_string(),
            description: None,
            config,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_template_only() {
        let tpl = template();
        let config = TemplateResolver::new()
            .resolve(Some(&tpl), None, "E1", "P1")
            .unwrap();
        assert_eq!(config, tpl.config);
        assert_eq!(config.id, "TPL-1");
    }

    #[test]
    fn test_override_replaces_field_wholesale() {
        let tpl = template();
        let ov = CommissionOverride {
            per_head: Some(PerHeadRule {
                rate: dec!(75000),
                min_guests: None,
                max_guests: None,
            }),
            bonus_tiers: Some(vec![BonusTier {
                threshold: 30,
                amount: dec!(300000),
                repeatable: true,
                label: None,
            }]),
            count_basis: Some(CountBasis::CheckedIn),
            ..Default::default()
        };

        let config = TemplateResolver::new()
            .resolve(Some(&tpl), Some(&ov), "E1", "P1")
            .unwrap();

        // 整体替换: 模板的 min/max 不会保留
        let per_head = config.per_head.unwrap();
        assert_eq!(per_head.rate, dec!(75000));
        assert_eq!(per_head.min_guests, None);
        assert_eq!(per_head.max_guests, None);

        assert_eq!(config.bonus_tiers.len(), 1);
        assert_eq!(config.count_basis, CountBasis::CheckedIn);
        // 未覆写字段保持模板值
        assert_eq!(config.fixed_fee, tpl.config.fixed_fee);
        assert_eq!(config.currency, "IDR");
        assert_eq!(config.id, "E1/P1");
    }

    #[test]
    fn test_empty_override_is_template() {
        let tpl = template();
        let config = TemplateResolver::new()
            .resolve(Some(&tpl), Some(&CommissionOverride::default()), "E1", "P1")
            .unwrap();
        assert_eq!(config.id, "TPL-1");
    }

    #[test]
    fn test_empty_tier_list_keeps_template_tiers() {
        let tpl = template();
        let resolver = TemplateResolver::new();

        // 仅有空档位列表: 等同无覆写
        let only_empty = CommissionOverride {
            bonus_tiers: Some(Vec::new()),
            ..Default::default()
        };
        let config = resolver
            .resolve(Some(&tpl), Some(&only_empty), "E1", "P1")
            .unwrap();
        assert_eq!(config, tpl.config);

        let with_fee = CommissionOverride {
            bonus_tiers: Some(Vec::new()),
            fixed_fee: Some(FixedFeeRule {
                amount: dec!(2000000),
                minimum_guests: None,
                below_minimum_percent: None,
            }),
            ..Default::default()
        };
        let config = resolver
            .resolve(Some(&tpl), Some(&with_fee), "E1", "P1")
            .unwrap();
        assert_eq!(config.bonus_tiers, tpl.config.bonus_tiers);
        assert_eq!(config.fixed_fee.unwrap().amount, dec!(2000000));
        assert_eq!(config.id, "E1/P1");
    }

    #[test]
    fn test_override_without_template() {
        let resolver = TemplateResolver::new();

        let ov = CommissionOverride {
            currency: Some("USD".to_string()),
            fixed_fee: Some(FixedFeeRule {
                amount: dec!(200),
                minimum_guests: None,
                below_minimum_percent: None,
            }),
            ..Default::default()
        };
        let config = resolver.resolve(None, Some(&ov), "E1", "P1").unwrap();
        assert_eq!(config.currency, "USD");
        assert!(config.fixed_fee.is_some());
        assert!(config.per_head.is_none());

        let no_currency = CommissionOverride {
            fixed_fee: ov.fixed_fee.clone(),
            ..Default::default()
        };
        let err = resolver.resolve(None, Some(&no_currency), "E1", "P1").unwrap_err();
        assert_eq!(err.field(), Some("currency"));
    }

    #[test]
    fn test_neither_template_nor_override() {
        let err = TemplateResolver::new()
            .resolve(None, None, "E1", "P1")
            .unwrap_err();
        assert_eq!(err.field(), Some("templateId"));
    }
}
