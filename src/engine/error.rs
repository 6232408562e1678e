// ==========================================
// 推广员佣金结算引擎 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 配置错误直接上抛，不以默认值替代
// ==========================================

use rust_decimal::Decimal;
use thiserror::Error;

/// 引擎层错误类型
///
/// 引擎不做 I/O，所有错误均为结构/配置问题
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommissionError {
    // ===== 配置错误 =====
    #[error("佣金配置错误 (config={config_id}, field={field}): {message}")]
    Configuration {
        config_id: String,
        field: String,
        message: String,
    },

    #[error("奖励档位无效 (config={config_id}, index={index}, threshold={threshold}, amount={amount}): {message}")]
    InvalidTier {
        config_id: String,
        index: usize,
        threshold: i64,
        amount: Decimal,
        message: String,
    },

    // ===== 金额计算错误 =====
    #[error("金额计算溢出 (component={component}): {detail}")]
    AmountOverflow { component: String, detail: String },

    // ===== 汇总错误 =====
    #[error("推广员层级存在环: promoter_id={promoter_id}")]
    PromoterHierarchyCycle { promoter_id: String },

    // ===== 结算批次错误 =====
    #[error("推广员未分配佣金配置: event={event_id}, promoter={promoter_id}")]
    UnassignedPromoter {
        event_id: String,
        promoter_id: String,
    },
}

impl CommissionError {
    pub fn configuration(
        config_id: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CommissionError::Configuration {
            config_id: config_id.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn overflow(component: impl Into<String>, detail: impl Into<String>) -> Self {
        CommissionError::AmountOverflow {
            component: component.into(),
            detail: detail.into(),
        }
    }

    /// 出错字段路径（仅配置错误）
    pub fn field(&self) -> Option<&str> {
        match self {
            CommissionError::Configuration { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result 类型别名
pub type CommissionResult<T> = Result<T, CommissionError>;
