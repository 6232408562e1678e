// ==========================================
// 推广员佣金结算引擎 - 活动数据导入器
// ==========================================
// 职责: CSV 行记录 → Registration / TableBooking
// 字段:
//   登记: id, event_id, referral_promoter_id, checked_in_at
//   订台: id, event_id, responsible_promoter_id, revenue, deposit
// 红线: 不做归因，不做计算
// ==========================================

use crate::domain::attribution::{EventActivity, Registration, TableBooking};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CsvParser, FileParser, RawRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::path::Path;
use tracing::{info, instrument};

const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// ActivityImporter - 活动数据导入器
// ==========================================
pub struct ActivityImporter {
    parser: Box<dyn FileParser>,
}

impl Default for ActivityImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityImporter {
    pub fn new() -> Self {
        Self {
            parser: Box::new(CsvParser),
        }
    }

    pub fn with_parser(parser: Box<dyn FileParser>) -> Self {
        Self { parser }
    }

    /// 导入登记文件
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn import_registrations(&self, path: &Path) -> ImportResult<Vec<Registration>> {
        let records = self.parser.parse_to_raw_records(path)?;
        let registrations = registrations_from_records(&records)?;
        info!(count = registrations.len(), "登记导入完成");
        Ok(registrations)
    }

    /// 导入订台文件
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn import_table_bookings(&self, path: &Path) -> ImportResult<Vec<TableBooking>> {
        let records = self.parser.parse_to_raw_records(path)?;
        let bookings = table_bookings_from_records(&records)?;
        info!(count = bookings.len(), "订台导入完成");
        Ok(bookings)
    }

    /// 导入单场活动（文件中其他活动的行被忽略）
    pub fn load_event(
        &self,
        event_id: &str,
        event_date: Option<NaiveDate>,
        registrations_path: &Path,
        table_bookings_path: Option<&Path>,
    ) -> ImportResult<EventActivity> {
        let mut registrations = self.import_registrations(registrations_path)?;
        registrations.retain(|r| r.event_id == event_id);

        let mut table_bookings = match table_bookings_path {
            Some(path) => self.import_table_bookings(path)?,
            None => Vec::new(),
        };
        table_bookings.retain(|b| b.event_id == event_id);

        Ok(EventActivity {
            event_id: event_id.to_string(),
            event_date,
            registrations,
            table_bookings,
        })
    }
}

/// 行记录 → 登记
pub fn registrations_from_records(records: &[RawRecord]) -> ImportResult<Vec<Registration>> {
    records
        .iter()
        .map(|record| {
            Ok(Registration {
                id: required(record, "id")?.to_string(),
                event_id: required(record, "event_id")?.to_string(),
                referral_promoter_id: record.get("referral_promoter_id").map(str::to_string),
                checked_in_at: record
                    .get("checked_in_at")
                    .map(|raw| parse_timestamp(record.row, "checked_in_at", raw))
                    .transpose()?,
            })
        })
        .collect()
}

/// 行记录 → 订台（deposit 缺省为 0）
pub fn table_bookings_from_records(records: &[RawRecord]) -> ImportResult<Vec<TableBooking>> {
    records
        .iter()
        .map(|record| {
            Ok(TableBooking {
                id: required(record, "id")?.to_string(),
                event_id: required(record, "event_id")?.to_string(),
                responsible_promoter_id: record
                    .get("responsible_promoter_id")
                    .unwrap_or_default()
                    .to_string(),
                revenue: parse_amount(record.row, "revenue", required(record, "revenue")?)?,
                deposit: record
                    .get("deposit")
                    .map(|raw| parse_amount(record.row, "deposit", raw))
                    .transpose()?
                    .unwrap_or(Decimal::ZERO),
            })
        })
        .collect()
}

fn required<'a>(record: &'a RawRecord, field: &str) -> ImportResult<&'a str> {
    record.get(field).ok_or_else(|| ImportError::MissingField {
        row: record.row,
        field: field.to_string(),
    })
}

fn parse_amount(row: usize, field: &str, raw: &str) -> ImportResult<Decimal> {
    let value = raw
        .replace(',', "")
        .parse::<Decimal>()
        .map_err(|e| ImportError::TypeConversionError {
            row,
            field: field.to_string(),
            message: format!("{} ({})", e, raw),
        })?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(ImportError::TypeConversionError {
            row,
            field: field.to_string(),
            message: format!("金额不能为负数: {}", raw),
        });
    }
    Ok(value)
}

fn parse_timestamp(row: usize, field: &str, raw: &str) -> ImportResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, NAIVE_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ImportError::DateFormatError {
            row,
            field: field.to_string(),
            value: raw.to_string(),
        })
}
