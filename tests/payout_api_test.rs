// ==========================================
// PayoutApi 集成测试
// ==========================================
// 覆盖: 模板保存校验 / 分配与覆写 / 单场与批量结算 / 配置读取 / 层级汇总
// ==========================================

mod helpers;
mod test_helpers;

use chrono::NaiveDate;
use helpers::activity_builder::ActivityBuilder;
use helpers::config_builder::ConfigBuilder;
use helpers::mock_settings::MockSettings;
use promoter_commission::api::{ApiError, PayoutApi};
use promoter_commission::config::config_keys;
use promoter_commission::domain::commission::{
    CommissionOverride, EventPromoterAssignment, PerHeadRule,
};
use promoter_commission::domain::promoter::Promoter;
use promoter_commission::domain::types::GroupBy;
use promoter_commission::engine::CommissionError;
use rust_decimal_macros::dec;
use std::sync::Arc;
use test_helpers::{create_test_api, create_test_db, insert_test_config, open_shared_connection};

fn assign(event: &str, promoter: &str, template: Option<&str>) -> EventPromoterAssignment {
    EventPromoterAssignment {
        event_id: event.to_string(),
        promoter_id: promoter.to_string(),
        template_id: template.map(str::to_string),
        override_config: None,
    }
}

fn seed_standard_template(api: &PayoutApi) {
    let template = ConfigBuilder::idr("TPL-STD")
        .per_head(dec!(50000), None, None)
        .tier(20, dec!(500000), true)
        .template("Standard");
    api.save_template(template).unwrap();
}

// ==========================================
// 模板
// ==========================================

#[test]
fn test_save_template_validates_before_persisting() {
    let (_tmp, api) = create_test_api().unwrap();

    let mut template = ConfigBuilder::idr("TPL-BAD")
        .table_percentage(dec!(10))
        .template("Bad");
    if let Some(rule) = template.config.table_commission.as_mut() {
        rule.rate = None;
    }

    match api.save_template(template) {
        Err(ApiError::CommissionRule(err)) => {
            assert_eq!(err.field(), Some("tableCommission.rate"))
        }
        other => panic!("expected configuration error, got {:?}", other),
    }
    assert!(api.list_templates().unwrap().is_empty());
    assert!(matches!(
        api.get_template("TPL-BAD"),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_save_template_normalizes_config_id() {
    let (_tmp, api) = create_test_api().unwrap();

    let mut template = ConfigBuilder::idr("ignored")
        .per_head(dec!(1000), None, None)
        .template("Weekday");
    template.template_id = "TPL-WEEKDAY".to_string();

    let saved = api.save_template(template).unwrap();
    assert_eq!(saved.config.id, "TPL-WEEKDAY");

    let loaded = api.get_template("TPL-WEEKDAY").unwrap();
    assert_eq!(loaded.config.id, "TPL-WEEKDAY");
    assert_eq!(api.list_templates().unwrap().len(), 1);
}

#[test]
fn test_delete_referenced_template_rejected() {
    let (_tmp, api) = create_test_api().unwrap();
    seed_standard_template(&api);
    api.assign(assign("E1", "P1", Some("TPL-STD"))).unwrap();

    assert!(matches!(
        api.delete_template("TPL-STD"),
        Err(ApiError::BusinessRuleViolation(_))
    ));

    assert!(api.unassign("E1", "P1").unwrap());
    api.delete_template("TPL-STD").unwrap();
    assert!(matches!(
        api.delete_template("TPL-STD"),
        Err(ApiError::NotFound(_))
    ));
}

// ==========================================
// 分配
// ==========================================

#[test]
fn test_assign_unknown_template_is_not_found() {
    let (_tmp, api) = create_test_api().unwrap();
    assert!(matches!(
        api.assign(assign("E1", "P1", Some("TPL-MISSING"))),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_assign_with_override_replaces_template_field() {
    let (_tmp, api) = create_test_api().unwrap();
    seed_standard_template(&api);

    let mut assignment = assign("E1", "P2", Some("TPL-STD"));
    assignment.override_config = Some(CommissionOverride {
        per_head: Some(PerHeadRule {
            rate: dec!(75000),
            min_guests: None,
            max_guests: None,
        }),
        ..Default::default()
    });
    let resolved = api.assign(assignment).unwrap();
    assert_eq!(resolved.id, "E1/P2");

    api.assign(assign("E1", "P1", Some("TPL-STD"))).unwrap();

    let configs = api.resolve_event_configs("E1").unwrap();
    assert_eq!(configs.len(), 2);
    assert_eq!(configs["P1"].id, "TPL-STD");
    assert_eq!(configs["P2"].per_head.as_ref().unwrap().rate, dec!(75000));
    // 未覆写字段来自模板
    assert_eq!(configs["P2"].bonus_tiers.len(), 1);
}

#[test]
fn test_assign_without_template_or_override_rejected() {
    let (_tmp, api) = create_test_api().unwrap();
    match api.assign(assign("E1", "P1", None)) {
        Err(ApiError::CommissionRule(CommissionError::Configuration { field, .. })) => {
            assert_eq!(field, "templateId")
        }
        other => panic!("expected configuration error, got {:?}", other),
    }
}

// ==========================================
// 结算
// ==========================================

#[tokio::test]
async fn test_calculate_event_end_to_end() {
    let (_tmp, api) = create_test_api().unwrap();
    seed_standard_template(&api);
    api.assign(assign("E1", "P1", Some("TPL-STD"))).unwrap();
    api.assign(assign("E1", "P2", Some("TPL-STD"))).unwrap();

    let activity = ActivityBuilder::new("E1")
        .date(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap())
        .guests(Some("P1"), 45, 30)
        .guests(Some("P9"), 3, 0)
        .guests(None, 10, 10)
        .build();

    let report = api.calculate_event(&activity).await.unwrap();

    assert_eq!(report.results.len(), 2);
    let p1 = &report.results[0];
    assert_eq!(p1.promoter_id, "P1");
    assert_eq!(p1.per_head_amount, dec!(2250000));
    assert_eq!(p1.bonus_amount, dec!(1000000));
    assert_eq!(p1.total, dec!(3250000));
    assert_eq!(p1.event_date, NaiveDate::from_ymd_opt(2026, 3, 14));

    assert_eq!(report.results[1].total, dec!(0));
    assert_eq!(report.unassigned_promoters, vec!["P9".to_string()]);
}

#[tokio::test]
async fn test_assign_trims_ids_before_matching_registrations() {
    let (_tmp, api) = create_test_api().unwrap();
    seed_standard_template(&api);

    let config = api
        .assign(assign(" E1 ", " P1", Some(" TPL-STD ")))
        .unwrap();
    assert_eq!(config.id, "TPL-STD");

    let activity = ActivityBuilder::new("E1").guests(Some("P1"), 10, 0).build();
    let report = api.calculate_event(&activity).await.unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].promoter_id, "P1");
    assert_eq!(report.results[0].per_head_amount, dec!(500000));
    assert!(report.unassigned_promoters.is_empty());
    assert!(api.unassign("E1", "P1").unwrap());
}

#[tokio::test]
async fn test_fail_on_unassigned_from_config_kv() {
    let (_tmp, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, config_keys::FAIL_ON_UNASSIGNED, "true").unwrap();

    let api = PayoutApi::open(&db_path).unwrap();
    seed_standard_template(&api);
    api.assign(assign("E1", "P1", Some("TPL-STD"))).unwrap();

    let activity = ActivityBuilder::new("E1")
        .guests(Some("P1"), 1, 0)
        .guests(Some("P7"), 1, 0)
        .build();

    match api.calculate_event(&activity).await {
        Err(ApiError::CommissionRule(CommissionError::UnassignedPromoter {
            promoter_id, ..
        })) => assert_eq!(promoter_id, "P7"),
        other => panic!("expected UnassignedPromoter, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_fail_on_unassigned_blocks_calculation() {
    let (_tmp, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, config_keys::FAIL_ON_UNASSIGNED, "maybe").unwrap();

    let api = PayoutApi::open(&db_path).unwrap();
    let activity = ActivityBuilder::new("E1").guests(Some("P1"), 1, 0).build();

    match api.calculate_event(&activity).await {
        Err(ApiError::ValidationError(msg)) => {
            assert!(msg.contains(config_keys::FAIL_ON_UNASSIGNED))
        }
        other => panic!("expected ValidationError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_minor_units_from_settings() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared_connection(&db_path).unwrap();
    let api = PayoutApi::with_settings(conn, Arc::new(MockSettings::idr_whole()));

    let template = ConfigBuilder::idr("TPL-PCT")
        .table_percentage(dec!(7.5))
        .template("Percent");
    api.save_template(template).unwrap();
    api.assign(assign("E1", "P1", Some("TPL-PCT"))).unwrap();

    let activity = ActivityBuilder::new("E1")
        .booking("P1", dec!(1234567), dec!(0))
        .build();
    let report = api.calculate_event(&activity).await.unwrap();

    assert_eq!(report.results[0].table_commission_amount, dec!(92592.525));
    assert_eq!(report.results[0].total, dec!(92593));
}

#[tokio::test]
async fn test_run_events_concurrently_preserves_order() {
    let (_tmp, api) = create_test_api().unwrap();
    seed_standard_template(&api);

    let mut activities = Vec::new();
    for i in 1..=5u32 {
        let event_id = format!("E{}", i);
        api.assign(assign(&event_id, "P1", Some("TPL-STD"))).unwrap();
        activities.push(ActivityBuilder::new(&event_id).guests(Some("P1"), i * 10, 0).build());
    }

    let reports = api.run_events(activities).await.unwrap();
    assert_eq!(reports.len(), 5);
    for (i, report) in reports.iter().enumerate() {
        let guests = (i as u32 + 1) * 10;
        assert_eq!(report.event_id, format!("E{}", i + 1));
        let expected_bonus = dec!(500000) * rust_decimal::Decimal::from(guests / 20);
        let expected = dec!(50000) * rust_decimal::Decimal::from(guests) + expected_bonus;
        assert_eq!(report.results[0].total, expected);
    }

    // 每次结算独立 run_id
    assert_ne!(reports[0].run_id, reports[1].run_id);
}

#[tokio::test]
async fn test_run_events_surfaces_strict_failure() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared_connection(&db_path).unwrap();
    let api = PayoutApi::with_settings(conn, Arc::new(MockSettings::strict()));

    let activities = vec![ActivityBuilder::new("E1").guests(Some("P1"), 1, 0).build()];
    assert!(matches!(
        api.run_events(activities).await,
        Err(ApiError::CommissionRule(CommissionError::UnassignedPromoter { .. }))
    ));
}

// ==========================================
// 推广员与汇总
// ==========================================

#[tokio::test]
async fn test_aggregate_promoter_tree_from_store() {
    let (_tmp, api) = create_test_api().unwrap();
    seed_standard_template(&api);

    api.save_promoter(Promoter {
        promoter_id: "P".to_string(),
        name: "Parent".to_string(),
        parent_id: None,
    })
    .unwrap();
    api.save_promoter(Promoter {
        promoter_id: "C".to_string(),
        name: "Child".to_string(),
        parent_id: Some("P".to_string()),
    })
    .unwrap();
    assert_eq!(api.list_promoters().unwrap().len(), 2);

    api.assign(assign("E1", "C", Some("TPL-STD"))).unwrap();
    api.assign(assign("E1", "P", Some("TPL-STD"))).unwrap();

    let activity = ActivityBuilder::new("E1")
        .guests(Some("C"), 2, 0)
        .guests(Some("P"), 1, 0)
        .build();
    let report = api.calculate_event(&activity).await.unwrap();

    let rows = api
        .aggregate(&report.results, GroupBy::PromoterTree, None, None)
        .unwrap();
    let p = rows.iter().find(|r| r.group_key == "P").unwrap();
    assert_eq!(p.totals_by_currency["IDR"], dec!(150000));

    let flat = api
        .aggregate(&report.results, GroupBy::Promoter, None, None)
        .unwrap();
    let p_flat = flat.iter().find(|r| r.group_key == "P").unwrap();
    assert_eq!(p_flat.totals_by_currency["IDR"], dec!(50000));
}

#[test]
fn test_save_promoter_rejects_cycle() {
    let (_tmp, api) = create_test_api().unwrap();
    api.save_promoter(Promoter {
        promoter_id: "A".to_string(),
        name: "A".to_string(),
        parent_id: Some("B".to_string()),
    })
    .unwrap();

    let result = api.save_promoter(Promoter {
        promoter_id: "B".to_string(),
        name: "B".to_string(),
        parent_id: Some("A".to_string()),
    });
    assert!(matches!(
        result,
        Err(ApiError::CommissionRule(CommissionError::PromoterHierarchyCycle { .. }))
    ));
}

#[test]
fn test_aggregate_rejects_inverted_range() {
    let (_tmp, api) = create_test_api().unwrap();
    let result = api.aggregate(
        &[],
        GroupBy::Promoter,
        NaiveDate::from_ymd_opt(2026, 4, 1),
        NaiveDate::from_ymd_opt(2026, 3, 1),
    );
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}
