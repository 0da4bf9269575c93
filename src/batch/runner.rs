use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::batch::report::WeekReport;
use crate::config::{Config, SharedConfig};
use crate::core::validation::{validate_agent_commission, validate_stats};
use crate::core::{compute_settlement, RuleTable};
use crate::error::{Result, SettlementError};
use crate::models::{
    AgreementConfig, ClubProfile, ResolutionSource, SecondaryDimension, SettlementKey,
    SettlementRecord, SettlementResult, WeeklyPlayStats,
};
use crate::store::{AgreementStore, RuleTableStore, SettlementSink};

/// One membership's raw results for the week being settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekEntry {
    pub membership_id: String,
    pub profit_loss: Decimal,
    pub rake: Decimal,
    #[serde(default)]
    pub hands_played: u64,
}

#[derive(Debug, Clone)]
pub enum EntryOutcome {
    Settled(Box<SettlementRecord>),
    Duplicate {
        membership_id: String,
    },
    Failed {
        membership_id: String,
        code: &'static str,
        message: String,
    },
}

impl EntryOutcome {
    pub fn membership_id(&self) -> &str {
        match self {
            EntryOutcome::Settled(record) => &record.key.membership_id,
            EntryOutcome::Duplicate { membership_id } => membership_id,
            EntryOutcome::Failed { membership_id, .. } => membership_id,
        }
    }
}

/// Club-level inputs shared by every player task of one batch.
struct ClubContext {
    club: ClubProfile,
    platform_agreement: AgreementConfig,
    platform_table: Option<RuleTable>,
    action_percentage: Decimal,
    week_start: NaiveDate,
    strict_tiers: bool,
}

/// Settles every player of a club-week. Players are independent: each runs
/// on its own task and one failure never stops the rest.
pub struct SettlementRunner {
    config: SharedConfig,
    tables: Arc<dyn RuleTableStore>,
    agreements: Arc<dyn AgreementStore>,
    sink: Arc<dyn SettlementSink>,
}

impl SettlementRunner {
    pub fn new(
        config: SharedConfig,
        tables: Arc<dyn RuleTableStore>,
        agreements: Arc<dyn AgreementStore>,
        sink: Arc<dyn SettlementSink>,
    ) -> Self {
        Self {
            config,
            tables,
            agreements,
            sink,
        }
    }

    pub async fn settle_week(
        &self,
        club_id: &str,
        week_start: NaiveDate,
        entries: Vec<WeekEntry>,
    ) -> Result<WeekReport> {
        let cfg: Config = self.config.read().await.clone();

        let club = self.agreements.club_profile(club_id).await?;
        let platform_agreement = club.platform_agreement()?;
        let platform_table = match platform_agreement.rule_table_id() {
            Some(id) => Some(self.tables.get_table(id).await?),
            None => None,
        };

        info!(
            "Settling club {} week {} ({} entries, platform {})",
            club_id,
            week_start,
            entries.len(),
            platform_agreement
        );

        let ctx = Arc::new(ClubContext {
            action_percentage: club.action_percentage_or(cfg.default_action_percentage),
            club,
            platform_agreement,
            platform_table,
            week_start,
            strict_tiers: cfg.strict_tiers,
        });

        let mut tasks = JoinSet::new();
        for entry in entries {
            let ctx = Arc::clone(&ctx);
            let tables = Arc::clone(&self.tables);
            let agreements = Arc::clone(&self.agreements);
            let sink = Arc::clone(&self.sink);
            tasks.spawn(async move {
                let membership_id = entry.membership_id.clone();
                match settle_entry(&ctx, &*tables, &*agreements, &*sink, entry).await {
                    Ok(record) => EntryOutcome::Settled(Box::new(record)),
                    Err(SettlementError::DuplicateSettlement { .. }) => {
                        warn!("{} already settled for {}", membership_id, ctx.week_start);
                        EntryOutcome::Duplicate { membership_id }
                    }
                    Err(e) => {
                        warn!("Settlement of {} failed: {}", membership_id, e);
                        EntryOutcome::Failed {
                            membership_id,
                            code: e.code(),
                            message: e.to_string(),
                        }
                    }
                }
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    warn!("Settlement task aborted: {}", e);
                    outcomes.push(EntryOutcome::Failed {
                        membership_id: "unknown".to_string(),
                        code: "task",
                        message: e.to_string(),
                    });
                }
            }
        }
        outcomes.sort_by(|a, b| a.membership_id().cmp(b.membership_id()));

        let report = WeekReport::from_outcomes(club_id, week_start, &outcomes);
        info!(
            "Club {} week {}: {} settled, {} duplicate, {} failed",
            club_id,
            week_start,
            report.settled_count(),
            report.duplicates.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

async fn settle_entry(
    ctx: &ClubContext,
    tables: &dyn RuleTableStore,
    agreements: &dyn AgreementStore,
    sink: &dyn SettlementSink,
    entry: WeekEntry,
) -> Result<SettlementRecord> {
    let membership = agreements.membership(&entry.membership_id).await?;
    if membership.club_id != ctx.club.club_id {
        return Err(SettlementError::not_found(
            "membership in club",
            format!("{}/{}", ctx.club.club_id, entry.membership_id),
        ));
    }

    let player_agreement = membership.effective_player_agreement(&ctx.club)?;
    let player_table = match player_agreement.rule_table_id() {
        Some(id) => Some(tables.get_table(id).await?),
        None => None,
    };

    let stats = WeeklyPlayStats::new(entry.profit_loss, entry.rake, entry.hands_played)
        .with_action(ctx.action_percentage);
    validate_stats(&stats)?;
    let agent_commission = membership.agent_commission();
    validate_agent_commission(agent_commission)?;

    let result = compute_settlement(
        &stats,
        &ctx.platform_agreement,
        &player_agreement,
        agent_commission,
        ctx.platform_table.as_ref(),
        player_table.as_ref(),
    )?;

    if result.has_unmatched_tier() {
        if ctx.strict_tiers {
            return Err(unmatched_error(ctx, player_table.as_ref(), &stats, &result));
        }
        warn!(
            "{}: no tier matched ratio {} (platform {}, player {}); paying 0%",
            membership.membership_id, result.ratio, result.platform_resolution, result.player_resolution
        );
    }

    let record = SettlementRecord {
        key: SettlementKey::new(&membership.membership_id, ctx.week_start),
        club_id: ctx.club.club_id.clone(),
        player_id: membership.player_id.clone(),
        agent_id: membership.agent.as_ref().map(|a| a.agent_id.clone()),
        stats,
        result,
        settled_at: Utc::now(),
    };
    sink.insert(record.clone()).await?;
    debug!("Settled {}", record.key);
    Ok(record)
}

fn unmatched_error(
    ctx: &ClubContext,
    player_table: Option<&RuleTable>,
    stats: &WeeklyPlayStats,
    result: &SettlementResult,
) -> SettlementError {
    let table = if result.platform_resolution == ResolutionSource::Unmatched {
        ctx.platform_table.as_ref()
    } else {
        player_table
    };
    let (table_id, dimension) = table
        .map(|t| (t.id.clone(), t.dimension))
        .unwrap_or_else(|| (String::new(), SecondaryDimension::HandsPlayed));
    let secondary = match dimension {
        SecondaryDimension::HandsPlayed => stats.hands(),
        SecondaryDimension::RakeVolume => stats.rake,
    };
    SettlementError::UnmatchedTier {
        table_id,
        ratio: result.ratio,
        dimension,
        secondary,
    }
}
