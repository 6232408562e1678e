// ==========================================
// 推广员佣金结算引擎 - 活动结算批次
// ==========================================
// 职责: 单场活动内所有推广员的归因 + 佣金计算
// 流程: 1) AttributionResolver::resolve_all
//       2) 有配置的推广员逐个计算（含零归因）
//       3) 有归因无配置的推广员列入 unassigned_promoters
// 说明: 无共享可变状态，多场活动可并发执行
// ==========================================

use crate::domain::attribution::{AttributionInput, EventActivity};
use crate::domain::commission::CommissionConfig;
use crate::domain::payout::EventPayoutReport;
use crate::engine::attribution_resolver::AttributionResolver;
use crate::engine::commission_calculator::CommissionCalculator;
use crate::engine::error::{CommissionError, CommissionResult};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// PayoutRunner - 活动结算执行器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct PayoutRunner {
    resolver: AttributionResolver,
    calculator: CommissionCalculator,
    fail_on_unassigned: bool,
}

impl PayoutRunner {
    pub fn new(calculator: CommissionCalculator) -> Self {
        Self {
            resolver: AttributionResolver::new(),
            calculator,
            fail_on_unassigned: false,
        }
    }

    /// 有归因但无配置的推广员是否直接报错（默认仅列出）
    pub fn fail_on_unassigned(mut self, enabled: bool) -> Self {
        self.fail_on_unassigned = enabled;
        self
    }

    pub fn calculator(&self) -> &CommissionCalculator {
        &self.calculator
    }

    /// 执行单场活动结算
    ///
    /// # 参数
    /// - activity: 活动登记/订台数据
    /// - configs: promoter_id → 已解析的佣金配置
    ///
    /// # 返回
    /// - Ok(EventPayoutReport): 结果按 promoter_id 排序
    /// - Err: 任一配置无效，或开启 fail_on_unassigned 时存在未分配推广员
    #[instrument(skip(self, activity, configs), fields(
        event_id = %activity.event_id,
        assigned = configs.len()
    ))]
    pub fn run_event(
        &self,
        activity: &EventActivity,
        configs: &BTreeMap<String, CommissionConfig>,
    ) -> CommissionResult<EventPayoutReport> {
        let event_id = activity.event_id.as_str();
        let mut attributions = self.resolver.resolve_all(
            event_id,
            &activity.registrations,
            &activity.table_bookings,
        );

        let unassigned_promoters: Vec<String> = attributions
            .keys()
            .filter(|promoter_id| !configs.contains_key(*promoter_id))
            .cloned()
            .collect();

        if let Some(first) = unassigned_promoters.first() {
            if self.fail_on_unassigned {
                return Err(CommissionError::UnassignedPromoter {
                    event_id: event_id.to_string(),
                    promoter_id: first.clone(),
                });
            }
            warn!(
                event_id,
                count = unassigned_promoters.len(),
                promoters = ?unassigned_promoters,
                "存在有归因但未分配佣金配置的推广员"
            );
        }

        let mut results = Vec::with_capacity(configs.len());
        for (promoter_id, config) in configs {
            let input = attributions
                .remove(promoter_id)
                .unwrap_or_else(|| AttributionInput::empty(event_id, promoter_id.as_str()));

            let mut result = self.calculator.calculate(config, &input)?;
            result.event_date = activity.event_date;
            results.push(result);
        }

        info!(
            event_id,
            results = results.len(),
            unassigned = unassigned_promoters.len(),
            "活动结算完成"
        );

        Ok(EventPayoutReport {
            run_id: Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            event_date: activity.event_date,
            results,
            unassigned_promoters,
        })
    }
}
