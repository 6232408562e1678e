// ==========================================
// 推广员佣金结算引擎 - 归因解析器
// ==========================================
// 职责: 将活动的登记/订台记录按推广员归集为计数
// 规则: 登记只归属登记时记录的推广员，不做二次归因
//       订台按 responsible_promoter_id 独立归属
// 输入: registrations + table_bookings
// 输出: AttributionInput（纯计算，无副作用）
// ==========================================

use crate::domain::attribution::{
    AttributedBooking, AttributionInput, Registration, TableBooking,
};
use std::collections::BTreeMap;
use tracing::instrument;

// ==========================================
// AttributionResolver - 归因解析器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AttributionResolver;

impl AttributionResolver {
    pub fn new() -> Self {
        Self
    }

    /// 解析单个推广员在某活动的归因
    ///
    /// 其他活动的记录、无推广员的登记一律忽略；空输入返回全零结果
    pub fn resolve(
        &self,
        event_id: &str,
        promoter_id: &str,
        registrations: &[Registration],
        table_bookings: &[TableBooking],
    ) -> AttributionInput {
        let mut input = AttributionInput::empty(event_id, promoter_id);

        for reg in registrations.iter().filter(|r| r.event_id == event_id) {
            if referral_of(reg) == Some(promoter_id) {
                input.guest_count += 1;
                if reg.checked_in_at.is_some() {
                    input.checked_in_count += 1;
                }
            }
        }

        input.table_bookings = table_bookings
            .iter()
            .filter(|b| b.event_id == event_id && responsible_of(b) == Some(promoter_id))
            .map(to_attributed)
            .collect();

        input
    }

    /// 一次遍历解析活动内所有推广员的归因
    ///
    /// 仅包含至少有一条登记或订台的推广员，按 promoter_id 排序
    #[instrument(skip(self, registrations, table_bookings), fields(
        registration_count = registrations.len(),
        booking_count = table_bookings.len()
    ))]
    pub fn resolve_all(
        &self,
        event_id: &str,
        registrations: &[Registration],
        table_bookings: &[TableBooking],
    ) -> BTreeMap<String, AttributionInput> {
        let mut by_promoter: BTreeMap<String, AttributionInput> = BTreeMap::new();

        for reg in registrations.iter().filter(|r| r.event_id == event_id) {
            let Some(promoter_id) = referral_of(reg) else {
                continue;
            };
            let entry = by_promoter
                .entry(promoter_id.to_string())
                .or_insert_with(|| AttributionInput::empty(event_id, promoter_id));
            entry.guest_count += 1;
            if reg.checked_in_at.is_some() {
                entry.checked_in_count += 1;
            }
        }

        for booking in table_bookings.iter().filter(|b| b.event_id == event_id) {
            let Some(promoter_id) = responsible_of(booking) else {
                continue;
            };
            by_promoter
                .entry(promoter_id.to_string())
                .or_insert_with(|| AttributionInput::empty(event_id, promoter_id))
                .table_bookings
                .push(to_attributed(booking));
        }

        tracing::debug!(event_id, promoters = by_promoter.len(), "归因解析完成");
        by_promoter
    }
}

fn referral_of(reg: &Registration) -> Option<&str> {
    reg.referral_promoter_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

fn responsible_of(booking: &TableBooking) -> Option<&str> {
    let id = booking.responsible_promoter_id.trim();
    (!id.is_empty()).then_some(id)
}

fn to_attributed(booking: &TableBooking) -> AttributedBooking {
    AttributedBooking {
        booking_id: booking.id.clone(),
        revenue: booking.revenue,
        deposit: booking.deposit,
    }
}
