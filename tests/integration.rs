mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use rakeback_settlement::batch::SettlementRunner;
use rakeback_settlement::config::Config;
use rakeback_settlement::error::SettlementError;
use rakeback_settlement::models::{
    RatioRule, RawAgreement, ResolutionSource, SecondaryDimension, SettlementKey,
};
use rakeback_settlement::scenario::Scenario;
use rakeback_settlement::store::{
    AgreementStore, InMemoryStore, RuleTableStore, SettlementSink,
};

use common::*;

fn lenient() -> Config {
    Config::default()
}

fn strict() -> Config {
    Config {
        strict_tiers: true,
        ..Config::default()
    }
}

#[tokio::test]
async fn club_week_settles_every_player() {
    let store = seeded_store(vec![
        membership("ana"),
        with_agent(membership("bruno"), dec!(10)),
        membership("davi"),
    ])
    .await;
    let runner = runner(&store, lenient());

    let report = runner
        .settle_week(
            CLUB,
            week(),
            vec![
                entry("ana", dec!(1000), dec!(2000), 420),
                entry("bruno", dec!(-2400), dec!(6000), 1310),
                entry("davi", dec!(500), dec!(0), 12),
            ],
        )
        .await
        .unwrap();

    assert_eq!(report.settled_count(), 3);
    assert!(report.failures.is_empty());
    assert!(report.unmatched.is_empty());

    // Outcomes come back ordered by membership id
    let ana = &report.lines[0].result;
    assert_eq!(ana.ratio, dec!(0.5));
    assert_eq!(ana.action_amount, dec!(200));
    assert_eq!(ana.platform_percentage, dec!(55));
    assert_eq!(ana.platform_amount, dec!(880));
    assert_eq!(ana.player_percentage, dec!(50));
    assert_eq!(ana.player_amount, dec!(800));
    assert_eq!(ana.platform_net_profit, dec!(80));

    let bruno = &report.lines[1].result;
    assert_eq!(bruno.ratio, dec!(-0.4));
    assert_eq!(bruno.action_amount, dec!(-480));
    assert_eq!(bruno.platform_percentage, dec!(65));
    assert_eq!(bruno.platform_amount, dec!(3120));
    assert_eq!(bruno.player_amount, dec!(1440));
    assert_eq!(bruno.agent_amount, dec!(144));
    assert_eq!(bruno.platform_net_profit, dec!(1536));
    assert_eq!(report.lines[1].agent_id.as_deref(), Some("agent-carla"));

    let davi = &report.lines[2].result;
    assert_eq!(davi.ratio, Decimal::ZERO);
    assert_eq!(davi.action_amount, Decimal::ZERO);
    assert_eq!(davi.platform_net_profit, Decimal::ZERO);
    assert_eq!(davi.player_resolution, ResolutionSource::Skipped);

    assert_eq!(report.totals.platform, dec!(4000));
    assert_eq!(report.totals.player, dec!(2240));
    assert_eq!(report.totals.agent, dec!(144));
    assert_eq!(report.totals.platform_net, dec!(1616));
    assert_eq!(report.totals.player_total_adjustment, dec!(1960));

    let stored = store
        .get(&SettlementKey::new("bruno", week()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.result.platform_net_profit, dec!(1536));
    assert_eq!(store.list_week(CLUB, week()).await.unwrap().len(), 3);
}

#[tokio::test]
async fn rerunning_a_week_is_rejected_per_player() {
    let store = seeded_store(vec![membership("ana"), membership("bruno")]).await;
    let runner = runner(&store, lenient());
    let entries = vec![
        entry("ana", dec!(100), dec!(400), 50),
        entry("bruno", dec!(-100), dec!(400), 50),
    ];

    let first = runner.settle_week(CLUB, week(), entries.clone()).await.unwrap();
    assert_eq!(first.settled_count(), 2);

    let second = runner.settle_week(CLUB, week(), entries).await.unwrap();
    assert_eq!(second.settled_count(), 0);
    assert_eq!(second.duplicates, vec!["ana".to_string(), "bruno".to_string()]);
    assert_eq!(store.settlement_count().await, 2);
}

#[tokio::test]
async fn same_membership_twice_in_one_batch_settles_once() {
    let store = seeded_store(vec![membership("ana")]).await;
    let runner = runner(&store, lenient());

    let report = runner
        .settle_week(
            CLUB,
            week(),
            vec![
                entry("ana", dec!(100), dec!(400), 50),
                entry("ana", dec!(100), dec!(400), 50),
            ],
        )
        .await
        .unwrap();

    assert_eq!(report.settled_count(), 1);
    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(store.settlement_count().await, 1);
}

#[tokio::test]
async fn unmatched_tier_warns_by_default() {
    let store = seeded_store_allowing_gaps(vec![membership("ana")]).await;
    let runner = runner(&store, lenient());

    // ratio -3 sits below the gapped player ladder
    let report = runner
        .settle_week(CLUB, week(), vec![entry("ana", dec!(-3000), dec!(1000), 90)])
        .await
        .unwrap();

    assert_eq!(report.unmatched, vec!["ana".to_string()]);
    let r = &report.lines[0].result;
    assert_eq!(r.player_resolution, ResolutionSource::Unmatched);
    assert_eq!(r.player_amount, Decimal::ZERO);
    assert_eq!(r.platform_net_profit, dec!(440));
}

#[tokio::test]
async fn unmatched_tier_fails_in_strict_mode() {
    let store = seeded_store_allowing_gaps(vec![membership("ana"), membership("bruno")]).await;
    let runner = runner(&store, strict());

    let report = runner
        .settle_week(
            CLUB,
            week(),
            vec![
                entry("ana", dec!(-3000), dec!(1000), 90),
                entry("bruno", dec!(200), dec!(1000), 90),
            ],
        )
        .await
        .unwrap();

    assert_eq!(report.settled_count(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].membership_id, "ana");
    assert_eq!(report.failures[0].code, "unmatched_tier");
    assert!(store
        .get(&SettlementKey::new("ana", week()))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn invalid_stats_fail_only_that_player() {
    let store = seeded_store(vec![membership("ana"), membership("bruno")]).await;
    let runner = runner(&store, lenient());

    let report = runner
        .settle_week(
            CLUB,
            week(),
            vec![
                entry("ana", dec!(10), dec!(-1), 5),
                entry("bruno", dec!(10), dec!(100), 5),
            ],
        )
        .await
        .unwrap();

    assert_eq!(report.settled_count(), 1);
    assert_eq!(report.failures[0].membership_id, "ana");
    assert_eq!(report.failures[0].code, "validation");
}

#[tokio::test]
async fn custom_membership_agreement_overrides_club_default() {
    let mut davi = membership("davi");
    davi.custom_agreement = true;
    davi.agreement = Some(RawAgreement::fixed(dec!(35)));
    let store = seeded_store(vec![davi]).await;
    let runner = runner(&store, lenient());

    let report = runner
        .settle_week(CLUB, week(), vec![entry("davi", dec!(1000), dec!(2000), 10)])
        .await
        .unwrap();

    let r = &report.lines[0].result;
    assert_eq!(r.player_percentage, dec!(35));
    assert_eq!(r.player_resolution, ResolutionSource::Fixed);
    assert_eq!(r.player_amount, dec!(560));
}

#[tokio::test]
async fn misconfigured_club_aborts_the_batch() {
    let store = seeded_store(vec![membership("ana")]).await;
    let mut broken = club();
    broken.platform_agreement = RawAgreement {
        fixed_percentage: None,
        ..RawAgreement::fixed(dec!(0))
    };
    store.upsert_club(broken).await;
    let runner = runner(&store, lenient());

    let err = runner
        .settle_week(CLUB, week(), vec![entry("ana", dec!(1), dec!(1), 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, SettlementError::InvalidAgreement(_)));
    assert_eq!(store.settlement_count().await, 0);
}

#[tokio::test]
async fn foreign_membership_is_refused() {
    let mut outsider = membership("eva");
    outsider.club_id = "club-boreal".to_string();
    let store = seeded_store(vec![outsider]).await;
    let runner = runner(&store, lenient());

    let report = runner
        .settle_week(CLUB, week(), vec![entry("eva", dec!(1), dec!(10), 1)])
        .await
        .unwrap();
    assert_eq!(report.failures[0].code, "not_found");
}

#[tokio::test]
async fn replaced_rules_apply_to_later_weeks_only() {
    let store = seeded_store(vec![membership("ana")]).await;
    let runner = runner(&store, lenient());

    let first = runner
        .settle_week(CLUB, week(), vec![entry("ana", dec!(1000), dec!(2000), 10)])
        .await
        .unwrap();
    assert_eq!(first.lines[0].result.player_percentage, dec!(50));

    store
        .replace_all_rules(
            "player-standard",
            vec![RatioRule::new(Decimal::MIN, None, dec!(45))],
        )
        .await
        .unwrap();

    let next_week = week() + chrono::Duration::days(7);
    let second = runner
        .settle_week(CLUB, next_week, vec![entry("ana", dec!(1000), dec!(2000), 10)])
        .await
        .unwrap();
    assert_eq!(second.lines[0].result.player_percentage, dec!(45));

    let old = store
        .get(&SettlementKey::new("ana", week()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(old.result.player_percentage, dec!(50));
}

#[tokio::test]
async fn heavy_loss_lands_in_bottom_tier_of_covered_ladder() {
    let store = seeded_store(vec![membership("ana")]).await;
    let runner = runner(&store, strict());

    let report = runner
        .settle_week(CLUB, week(), vec![entry("ana", dec!(-3000), dec!(1000), 90)])
        .await
        .unwrap();

    assert!(report.unmatched.is_empty());
    assert_eq!(report.lines[0].result.player_percentage, dec!(20));
    assert_eq!(report.lines[0].result.player_amount, dec!(160));
}

#[tokio::test]
async fn gapped_replacement_is_refused_and_old_rules_stay() {
    let store = seeded_store(vec![membership("ana")]).await;

    let err = store
        .replace_all_rules(
            "player-standard",
            vec![RatioRule::new(dec!(0), None, dec!(45))],
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_rule_table");
    assert_eq!(
        store.get_table("player-standard").await.unwrap().rules().len(),
        4
    );
}

#[tokio::test]
async fn overflowing_entry_fails_with_its_own_membership() {
    let store = seeded_store(vec![membership("ana"), membership("bruno")]).await;
    let runner = runner(&store, lenient());

    let report = runner
        .settle_week(
            CLUB,
            week(),
            vec![
                entry("ana", dec!(1e25), dec!(0.0001), 10),
                entry("bruno", dec!(100), dec!(400), 50),
            ],
        )
        .await
        .unwrap();

    assert_eq!(report.settled_count(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].membership_id, "ana");
    assert_eq!(report.failures[0].code, "arithmetic");
}

#[tokio::test]
async fn club_agreement_on_hands_table_fails_each_player() {
    let store = seeded_store(vec![membership("ana")]).await;
    let mut miswired = club();
    miswired.platform_agreement = RawAgreement::dynamic("player-standard");
    store.upsert_club(miswired).await;
    let runner = runner(&store, lenient());

    let report = runner
        .settle_week(CLUB, week(), vec![entry("ana", dec!(100), dec!(5000), 5)])
        .await
        .unwrap();

    assert_eq!(report.settled_count(), 0);
    assert_eq!(report.failures[0].code, "dimension_mismatch");
    assert_eq!(store.settlement_count().await, 0);
}

#[tokio::test]
async fn custom_agreement_on_rake_table_fails_that_player() {
    let mut davi = membership("davi");
    davi.custom_agreement = true;
    davi.agreement = Some(RawAgreement::dynamic("club-volume"));
    let store = seeded_store(vec![davi, membership("ana")]).await;
    let runner = runner(&store, lenient());

    let report = runner
        .settle_week(
            CLUB,
            week(),
            vec![
                entry("ana", dec!(100), dec!(400), 50),
                entry("davi", dec!(100), dec!(400), 50),
            ],
        )
        .await
        .unwrap();

    assert_eq!(report.settled_count(), 1);
    assert_eq!(report.failures[0].membership_id, "davi");
    assert_eq!(report.failures[0].code, "dimension_mismatch");
    assert!(report.failures[0]
        .message
        .contains(SecondaryDimension::RakeVolume.as_str()));
}

#[tokio::test]
async fn demo_scenario_runs_end_to_end() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/scenario.json");
    let scenario = Scenario::from_file(path).unwrap();
    let store = Arc::new(InMemoryStore::new());
    scenario.load_into(&store).await.unwrap();

    assert_eq!(store.memberships("club-aurora").await.unwrap().len(), 3);
    assert!(store.get_table("club-volume").await.is_ok());

    let runner = SettlementRunner::new(
        Config::default().shared(),
        store.clone(),
        store.clone(),
        store.clone(),
    );
    let week = &scenario.weeks[0];
    let start = week.resolve_week_start(scenario.club_timezone(&week.club_id, chrono_tz::Tz::UTC));
    assert_eq!(start, common::week());

    let report = runner
        .settle_week(&week.club_id, start, week.entries.clone())
        .await
        .unwrap();
    assert_eq!(report.settled_count(), 3);
    assert_eq!(report.totals.rake, dec!(8000));
    assert_eq!(report.totals.platform_net, dec!(1616));
}
