// ==========================================
// 推广员佣金结算引擎 - 归因输入模型
// ==========================================
// 职责: 外部登记/订台记录 + 按推广员归因后的计数
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// Registration - 宾客登记
// ==========================================
// 由登记系统提供；referral_promoter_id 在登记时记录，之后不再改变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub event_id: String,
    #[serde(default)]
    pub referral_promoter_id: Option<String>,
    #[serde(default)]
    pub checked_in_at: Option<DateTime<Utc>>,
}

// ==========================================
// TableBooking - 订台记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableBooking {
    pub id: String,
    pub event_id: String,
    pub responsible_promoter_id: String,
    pub revenue: Decimal,
    pub deposit: Decimal,
}

/// 归因到某推广员的订台（计算订台佣金用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributedBooking {
    pub booking_id: String,
    pub revenue: Decimal,
    pub deposit: Decimal,
}

// ==========================================
// AttributionInput - 单活动单推广员的归因结果
// ==========================================
// 临时对象，不落库
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionInput {
    pub event_id: String,
    pub promoter_id: String,
    pub guest_count: u32,      // 登记人数
    pub checked_in_count: u32, // 其中已签到人数
    pub table_bookings: Vec<AttributedBooking>,
}

impl AttributionInput {
    /// 全零归因（无登记、无订台）
    pub fn empty(event_id: impl Into<String>, promoter_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            promoter_id: promoter_id.into(),
            guest_count: 0,
            checked_in_count: 0,
            table_bookings: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.guest_count == 0 && self.table_bookings.is_empty()
    }
}

// ==========================================
// EventActivity - 一场活动的结算输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventActivity {
    pub event_id: String,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub registrations: Vec<Registration>,
    #[serde(default)]
    pub table_bookings: Vec<TableBooking>,
}
