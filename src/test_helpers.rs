use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal_macros::dec;

use crate::core::{compute_settlement, RuleTable};
use crate::models::{
    AgreementConfig, RatioDomain, RatioRule, SettlementKey, SettlementRecord, WeeklyPlayStats,
};

/// profit 1000, rake 2000, action 20%: ratio 0.5, action 200, pool 1600.
pub fn scenario_a_stats() -> WeeklyPlayStats {
    WeeklyPlayStats::new(dec!(1000), dec!(2000), 300).with_action(dec!(20))
}

/// Unclamped player table: [-1,-0.5) 20%, [-0.5,0) 30%, [0,0.5) 40%, [0.5,∞) 50%.
/// Ratios below -1 match nothing.
pub fn player_ladder() -> RuleTable {
    RuleTable::player("player-ladder")
        .named("Player ladder")
        .with_rules_allowing_gaps(vec![
            RatioRule::new(dec!(-1), Some(dec!(-0.5)), dec!(20)).with_priority(1),
            RatioRule::new(dec!(-0.5), Some(dec!(0)), dec!(30)).with_priority(2),
            RatioRule::new(dec!(0), Some(dec!(0.5)), dec!(40)).with_priority(3),
            RatioRule::new(dec!(0.5), None, dec!(50)).with_priority(4),
        ])
        .unwrap()
}

/// Club table clamped to [-1, 1] whose tiers cover the whole domain.
pub fn unit_club_table() -> RuleTable {
    RuleTable::club("club-unit")
        .with_domain(RatioDomain::unit())
        .with_rules(vec![
            RatioRule::new(dec!(-1), Some(dec!(-0.5)), dec!(70)).with_priority(4),
            RatioRule::new(dec!(-0.5), Some(dec!(0)), dec!(65)).with_priority(3),
            RatioRule::new(dec!(0), Some(dec!(0.5)), dec!(60)).with_priority(2),
            RatioRule::new(dec!(0.5), None, dec!(50)).with_priority(1),
        ])
        .unwrap()
}

pub fn test_week() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

/// Scenario B settlement (platform 60%, player 50%, no agent) as a stored record.
pub fn sample_record(membership_id: &str, club_id: &str) -> SettlementRecord {
    let result = compute_settlement(
        &scenario_a_stats(),
        &AgreementConfig::fixed(dec!(60)),
        &AgreementConfig::fixed(dec!(50)),
        None,
        None,
        None,
    )
    .unwrap();
    SettlementRecord {
        key: SettlementKey::new(membership_id, test_week()),
        club_id: club_id.to_string(),
        player_id: format!("player-{}", membership_id),
        agent_id: None,
        stats: scenario_a_stats(),
        result,
        settled_at: DateTime::parse_from_rfc3339("2024-01-22T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc),
    }
}
