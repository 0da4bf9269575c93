use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use rakeback_settlement::batch::{SettlementRunner, WeekEntry};
use rakeback_settlement::config::Config;
use rakeback_settlement::core::RuleTable;
use rakeback_settlement::models::{
    AgentLink, ClubProfile, Membership, RatioDomain, RatioRule, RawAgreement,
};
use rakeback_settlement::store::InMemoryStore;

pub const CLUB: &str = "club-aurora";

pub fn week() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

/// Rake-volume club table: 55% under 5000 rake, 65% from 5000 up.
pub fn club_volume_table() -> RuleTable {
    RuleTable::club("club-volume")
        .with_domain(RatioDomain::unit())
        .with_rules(vec![
            RatioRule::new(dec!(-1), None, dec!(55))
                .with_secondary(dec!(0), Some(dec!(5000)))
                .with_priority(1),
            RatioRule::new(dec!(-1), None, dec!(65))
                .with_secondary(dec!(5000), None)
                .with_priority(2),
        ])
        .unwrap()
}

fn player_tiers(lowest: Decimal) -> Vec<RatioRule> {
    vec![
        RatioRule::new(lowest, Some(dec!(-0.5)), dec!(20)).with_priority(1),
        RatioRule::new(dec!(-0.5), Some(dec!(0)), dec!(30)).with_priority(2),
        RatioRule::new(dec!(0), Some(dec!(0.5)), dec!(40)).with_priority(3),
        RatioRule::new(dec!(0.5), None, dec!(50)).with_priority(4),
    ]
}

/// Unclamped player ladder whose bottom tier reaches every loss.
pub fn player_table() -> RuleTable {
    RuleTable::player("player-standard")
        .with_rules(player_tiers(Decimal::MIN))
        .unwrap()
}

/// Same ladder starting at ratio -1; heavier losses match no tier.
pub fn gapped_player_table() -> RuleTable {
    RuleTable::player("player-standard")
        .with_rules_allowing_gaps(player_tiers(dec!(-1)))
        .unwrap()
}

pub fn club() -> ClubProfile {
    ClubProfile {
        club_id: CLUB.to_string(),
        name: "Aurora".to_string(),
        action_percentage: Some(dec!(20)),
        platform_agreement: RawAgreement::dynamic("club-volume"),
        player_agreement: RawAgreement::dynamic("player-standard"),
        timezone: Some("America/Sao_Paulo".to_string()),
    }
}

pub fn membership(id: &str) -> Membership {
    Membership {
        membership_id: id.to_string(),
        club_id: CLUB.to_string(),
        player_id: format!("player-{}", id),
        custom_agreement: false,
        agreement: None,
        agent: None,
    }
}

pub fn with_agent(mut m: Membership, commission: Decimal) -> Membership {
    m.agent = Some(AgentLink {
        agent_id: "agent-carla".to_string(),
        commission_percentage: commission,
    });
    m
}

pub fn entry(id: &str, profit_loss: Decimal, rake: Decimal, hands: u64) -> WeekEntry {
    WeekEntry {
        membership_id: id.to_string(),
        profit_loss,
        rake,
        hands_played: hands,
    }
}

/// Store holding the Aurora club, both tables and the given memberships.
pub async fn seeded_store(memberships: Vec<Membership>) -> Arc<InMemoryStore> {
    seed(InMemoryStore::new(), player_table(), memberships).await
}

/// Lenient store carrying the gapped player ladder.
pub async fn seeded_store_allowing_gaps(memberships: Vec<Membership>) -> Arc<InMemoryStore> {
    seed(InMemoryStore::allowing_gaps(), gapped_player_table(), memberships).await
}

async fn seed(
    store: InMemoryStore,
    player: RuleTable,
    memberships: Vec<Membership>,
) -> Arc<InMemoryStore> {
    let store = Arc::new(store);
    store.insert_table(club_volume_table()).await.unwrap();
    store.insert_table(player).await.unwrap();
    store.upsert_club(club()).await;
    for m in memberships {
        store.upsert_membership(m).await;
    }
    store
}

pub fn runner(store: &Arc<InMemoryStore>, cfg: Config) -> SettlementRunner {
    SettlementRunner::new(cfg.shared(), store.clone(), store.clone(), store.clone())
}
