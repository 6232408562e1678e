// ==========================================
// 推广员佣金结算引擎 - 数据导入层
// ==========================================
// 职责: 读取活动登记/订台 CSV，映射为领域对象
// 红线: 导入层不做归因、不做佣金计算
// ==========================================

pub mod activity_importer;
pub mod error;
pub mod file_parser;

pub use activity_importer::{
    registrations_from_records, table_bookings_from_records, ActivityImporter,
};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, FileParser, RawRecord};
