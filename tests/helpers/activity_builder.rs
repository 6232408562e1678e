// ==========================================
// 活动数据构建器 - 用于集成测试
// ==========================================

use chrono::{NaiveDate, TimeZone, Utc};
use promoter_commission::domain::attribution::{
    AttributedBooking, AttributionInput, EventActivity, Registration, TableBooking,
};
use rust_decimal::Decimal;

pub struct ActivityBuilder {
    activity: EventActivity,
    next_id: usize,
}

impl ActivityBuilder {
    pub fn new(event_id: &str) -> Self {
        Self {
            activity: EventActivity {
                event_id: event_id.to_string(),
                event_date: None,
                registrations: Vec::new(),
                table_bookings: Vec::new(),
            },
            next_id: 1,
        }
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.activity.event_date = Some(date);
        self
    }

    /// 为推广员追加 count 条登记，其中前 checked_in 条已签到
    pub fn guests(mut self, promoter_id: Option<&str>, count: u32, checked_in: u32) -> Self {
        for i in 0..count {
            let checked_in_at = (i < checked_in)
                .then(|| Utc.with_ymd_and_hms(2026, 3, 14, 22, 0, 0).unwrap());
            self.activity.registrations.push(Registration {
                id: format!("R{}", self.next_id),
                event_id: self.activity.event_id.clone(),
                referral_promoter_id: promoter_id.map(str::to_string),
                checked_in_at,
            });
            self.next_id += 1;
        }
        self
    }

    pub fn booking(mut self, promoter_id: &str, revenue: Decimal, deposit: Decimal) -> Self {
        self.activity.table_bookings.push(TableBooking {
            id: format!("B{}", self.next_id),
            event_id: self.activity.event_id.clone(),
            responsible_promoter_id: promoter_id.to_string(),
            revenue,
            deposit,
        });
        self.next_id += 1;
        self
    }

    pub fn build(self) -> EventActivity {
        self.activity
    }
}

/// 直接构造归因输入
pub fn attribution(guest_count: u32, checked_in_count: u32, revenues: &[Decimal]) -> AttributionInput {
    AttributionInput {
        event_id: "E1".to_string(),
        promoter_id: "P1".to_string(),
        guest_count,
        checked_in_count,
        table_bookings: revenues
            .iter()
            .enumerate()
            .map(|(i, revenue)| AttributedBooking {
                booking_id: format!("B{}", i + 1),
                revenue: *revenue,
                deposit: Decimal::ZERO,
            })
            .collect(),
    }
}
