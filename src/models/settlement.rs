use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::WeeklyPlayStats;

/// Where a resolved percentage came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionSource {
    Fixed,
    /// `index` is the rule's position in the table as authored.
    Tier { index: usize, priority: i32 },
    /// Dynamic lookup found no tier; the percentage fell back to zero.
    Unmatched,
    /// No lookup ran because there was no rake to split.
    Skipped,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionSource::Fixed => write!(f, "fixed"),
            ResolutionSource::Tier { index, priority } => {
                write!(f, "tier #{} (p{})", index, priority)
            }
            ResolutionSource::Unmatched => write!(f, "unmatched"),
            ResolutionSource::Skipped => write!(f, "skipped"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub percentage: Decimal,
    pub source: ResolutionSource,
}

impl Resolution {
    pub fn fixed(percentage: Decimal) -> Self {
        Self {
            percentage,
            source: ResolutionSource::Fixed,
        }
    }

    pub fn unmatched() -> Self {
        Self {
            percentage: Decimal::ZERO,
            source: ResolutionSource::Unmatched,
        }
    }

    pub fn skipped() -> Self {
        Self {
            percentage: Decimal::ZERO,
            source: ResolutionSource::Skipped,
        }
    }

    pub fn is_unmatched(&self) -> bool {
        self.source == ResolutionSource::Unmatched
    }
}

/// Computed breakdown for one player-club-week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub ratio: Decimal,
    pub action_amount: Decimal,
    pub rake_available_for_split: Decimal,
    pub player_percentage: Decimal,
    pub player_amount: Decimal,
    pub platform_percentage: Decimal,
    pub platform_amount: Decimal,
    pub agent_commission_percentage: Decimal,
    pub agent_amount: Decimal,
    pub platform_net_profit: Decimal,
    pub platform_resolution: ResolutionSource,
    pub player_resolution: ResolutionSource,
}

impl SettlementResult {
    /// Total owed to the player: action side channel plus rakeback.
    pub fn player_total_adjustment(&self) -> Decimal {
        self.action_amount + self.player_amount
    }

    pub fn has_unmatched_tier(&self) -> bool {
        self.platform_resolution == ResolutionSource::Unmatched
            || self.player_resolution == ResolutionSource::Unmatched
    }
}

/// Uniqueness key of a persisted settlement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SettlementKey {
    pub membership_id: String,
    pub week_start: NaiveDate,
}

impl SettlementKey {
    pub fn new(membership_id: impl Into<String>, week_start: NaiveDate) -> Self {
        Self {
            membership_id: membership_id.into(),
            week_start,
        }
    }
}

impl fmt::Display for SettlementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.membership_id, self.week_start)
    }
}

/// Immutable snapshot written to the settlement sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub key: SettlementKey,
    pub club_id: String,
    pub player_id: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    /// The week's play the result was computed from.
    pub stats: WeeklyPlayStats,
    pub result: SettlementResult,
    pub settled_at: DateTime<Utc>,
}
