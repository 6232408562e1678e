// ==========================================
// 推广员佣金结算引擎 - 引擎层
// ==========================================
// 职责: 归因、阶梯奖励、佣金计算、汇总
// 红线: Engine 不拼 SQL，纯函数无共享可变状态
// ==========================================

pub mod aggregator;
pub mod attribution_resolver;
pub mod commission_calculator;
pub mod config_validator;
pub mod error;
pub mod payout_run;
pub mod tier_evaluator;

// 重导出核心引擎
pub use aggregator::Aggregator;
pub use attribution_resolver::AttributionResolver;
pub use commission_calculator::CommissionCalculator;
pub use config_validator::ConfigValidator;
pub use error::{CommissionError, CommissionResult};
pub use payout_run::PayoutRunner;
pub use tier_evaluator::TierEvaluator;
