// ==========================================
// 推广员佣金结算引擎 - 领域类型定义
// ==========================================
// 职责: 佣金规则中使用的枚举类型
// 序列化格式: snake_case (与配置 JSON 一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订台佣金模式 (Table Commission Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableCommissionMode {
    Percentage, // 按订台金额百分比
    FlatFee,    // 每张订台固定金额
}

impl fmt::Display for TableCommissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TableCommissionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableCommissionMode::Percentage => "percentage",
            TableCommissionMode::FlatFee => "flat_fee",
        }
    }
}

// ==========================================
// 订台佣金计提基数 (Table Commission Base)
// ==========================================
// 仅 Percentage 模式使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableCommissionBase {
    #[default]
    Revenue, // 订台总消费
    Deposit, // 订金
}

impl fmt::Display for TableCommissionBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableCommissionBase::Revenue => write!(f, "revenue"),
            TableCommissionBase::Deposit => write!(f, "deposit"),
        }
    }
}

// ==========================================
// 人数口径 (Count Basis)
// ==========================================
// 决定人头费/固定费/奖励按哪个人数计算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountBasis {
    #[default]
    Registered, // 登记人数
    CheckedIn,  // 到场签到人数
}

impl fmt::Display for CountBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountBasis::Registered => write!(f, "registered"),
            CountBasis::CheckedIn => write!(f, "checked_in"),
        }
    }
}

// ==========================================
// 汇总分组方式 (Group By)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Promoter,     // 按推广员
    PromoterTree, // 按推广员层级（上级包含下级）
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Promoter => write!(f, "promoter"),
            GroupBy::PromoterTree => write!(f, "promoter_tree"),
        }
    }
}

impl GroupBy {
    /// 从字符串解析分组方式（CLI / 查询参数）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "promoter" => Some(GroupBy::Promoter),
            "promoter_tree" | "promotertree" | "tree" => Some(GroupBy::PromoterTree),
            _ => None,
        }
    }
}
