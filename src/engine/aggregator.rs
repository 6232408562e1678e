// ==========================================
// 推广员佣金结算引擎 - 结算汇总器
// ==========================================
// 职责: 跨活动/日期范围汇总 PayoutResult
// 规则: 1) 按币种分桶累加 total，不做汇率换算
//       2) PromoterTree: 下级金额同时计入自身及所有上级
//       3) 纯聚合，不修改原始结果
// ==========================================

use crate::domain::payout::{AggregateRow, PayoutResult};
use crate::domain::promoter::PromoterDirectory;
use crate::domain::types::GroupBy;
use crate::engine::error::{CommissionError, CommissionResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::instrument;

#[derive(Default)]
struct Bucket<'a> {
    totals_by_currency: BTreeMap<String, Decimal>,
    events: BTreeSet<&'a str>,
    result_count: usize,
}

// ==========================================
// Aggregator - 结算汇总器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// 汇总结算结果
    ///
    /// GroupBy::Promoter 不读取 directory；输出按 group_key 排序
    #[instrument(skip_all, fields(result_count = results.len(), group_by = %group_by))]
    pub fn aggregate(
        &self,
        results: &[PayoutResult],
        group_by: GroupBy,
        directory: &PromoterDirectory,
    ) -> CommissionResult<Vec<AggregateRow>> {
        let mut buckets: BTreeMap<String, Bucket<'_>> = BTreeMap::new();

        for result in results {
            let keys = match group_by {
                GroupBy::Promoter => vec![result.promoter_id.clone()],
                GroupBy::PromoterTree => {
                    let mut keys = vec![result.promoter_id.clone()];
                    keys.extend(self.ancestors(&result.promoter_id, directory)?);
                    keys
                }
            };

            for key in keys {
                let bucket = buckets.entry(key.clone()).or_default();
                let sum = bucket
                    .totals_by_currency
                    .entry(result.currency.clone())
                    .or_insert(Decimal::ZERO);
                *sum = sum.checked_add(result.total).ok_or_else(|| {
                    CommissionError::overflow(
                        "aggregate",
                        format!("group={}, currency={}", key, result.currency),
                    )
                })?;
                bucket.events.insert(result.event_id.as_str());
                bucket.result_count += 1;
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(group_key, bucket)| AggregateRow {
                group_key,
                totals_by_currency: bucket.totals_by_currency,
                event_count: bucket.events.len(),
                result_count: bucket.result_count,
            })
            .collect())
    }

    /// 仅汇总活动日期落在 [from, to] 内的结果
    ///
    /// 任一边界给定时，无活动日期的结果被排除
    pub fn aggregate_range(
        &self,
        results: &[PayoutResult],
        group_by: GroupBy,
        directory: &PromoterDirectory,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> CommissionResult<Vec<AggregateRow>> {
        if from.is_none() && to.is_none() {
            return self.aggregate(results, group_by, directory);
        }

        let in_range: Vec<PayoutResult> = results
            .iter()
            .filter(|r| match r.event_date {
                Some(date) => from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t),
                None => false,
            })
            .cloned()
            .collect();

        self.aggregate(&in_range, group_by, directory)
    }

    /// 自下而上的全部上级
    ///
    /// 上级链出现环时报错
    pub fn ancestors(
        &self,
        promoter_id: &str,
        directory: &PromoterDirectory,
    ) -> CommissionResult<Vec<String>> {
        let mut chain = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(promoter_id);

        let mut current = promoter_id;
        while let Some(parent) = directory.parent_of(current) {
            if !visited.insert(parent) {
                return Err(CommissionError::PromoterHierarchyCycle {
                    promoter_id: promoter_id.to_string(),
                });
            }
            chain.push(parent.to_string());
            current = parent;
        }

        Ok(chain)
    }
}
