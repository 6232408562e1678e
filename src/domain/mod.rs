// ==========================================
// 推广员佣金结算引擎 - 领域模型层
// ==========================================
// 职责: 定义佣金规则、归因输入、结算结果
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod attribution;
pub mod commission;
pub mod payout;
pub mod promoter;
pub mod types;

// 重导出核心类型
pub use attribution::{AttributedBooking, AttributionInput, EventActivity, Registration, TableBooking};
pub use commission::{
    BonusTier, CommissionConfig, CommissionOverride, CommissionTemplate, EventPromoterAssignment,
    FixedFeeRule, PerHeadRule, SimpleBonus, TableCommissionRule,
};
pub use payout::{AggregateRow, BonusEntry, EventPayoutReport, PayoutResult};
pub use promoter::{Promoter, PromoterDirectory};
pub use types::{CountBasis, GroupBy, TableCommissionBase, TableCommissionMode};
