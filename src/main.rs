// ==========================================
// 推广员佣金结算引擎 - 命令行入口
// ==========================================
// 用法: promoter-payout <event_id> <registrations.csv> [table_bookings.csv]
//                       [--db <path>] [--date YYYY-MM-DD]
// 输出: EventPayoutReport（JSON，stdout）
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use promoter_commission::api::PayoutApi;
use promoter_commission::importer::ActivityImporter;
use promoter_commission::{db, logging};
use std::path::PathBuf;

const USAGE: &str = "用法: promoter-payout <event_id> <registrations.csv> [table_bookings.csv] [--db <path>] [--date YYYY-MM-DD]";

#[derive(Debug)]
struct CliArgs {
    event_id: String,
    registrations: PathBuf,
    table_bookings: Option<PathBuf>,
    db_path: Option<String>,
    event_date: Option<NaiveDate>,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<CliArgs> {
    let mut positional = Vec::new();
    let mut db_path = None;
    let mut event_date = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                db_path = Some(args.next().context("--db 缺少路径参数")?);
            }
            "--date" => {
                let raw = args.next().context("--date 缺少日期参数")?;
                let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .with_context(|| format!("无效的活动日期: {}", raw))?;
                event_date = Some(date);
            }
            "-h" | "--help" => bail!(USAGE),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let (Some(event_id), Some(registrations)) = (positional.next(), positional.next()) else {
        bail!(USAGE);
    };
    let table_bookings = positional.next().map(PathBuf::from);
    if positional.next().is_some() {
        bail!(USAGE);
    }

    Ok(CliArgs {
        event_id,
        registrations: PathBuf::from(registrations),
        table_bookings,
        db_path,
        event_date,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args = parse_args(std::env::args().skip(1))?;
    let db_path = db::resolve_db_path(args.db_path.as_deref());

    tracing::info!("==================================================");
    tracing::info!("{} v{}", promoter_commission::APP_NAME, promoter_commission::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("==================================================");

    let api = PayoutApi::open(&db_path).context("无法打开结算数据库")?;

    let activity = ActivityImporter::new()
        .load_event(
            &args.event_id,
            args.event_date,
            &args.registrations,
            args.table_bookings.as_deref(),
        )
        .context("活动数据导入失败")?;

    let report = api
        .calculate_event(&activity)
        .await
        .with_context(|| format!("活动 {} 结算失败", args.event_id))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
