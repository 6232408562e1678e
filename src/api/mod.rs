// ==========================================
// 推广员佣金结算引擎 - API 层
// ==========================================
// 职责: 组合仓储与引擎，供 CLI 与集成方调用
// ==========================================

pub mod error;
pub mod payout_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use payout_api::PayoutApi;
