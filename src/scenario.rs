use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::batch::WeekEntry;
use crate::config::parse_timezone;
use crate::core::{week, RuleTable};
use crate::models::{ClubProfile, Membership};
use crate::store::InMemoryStore;

/// A JSON description of clubs, memberships, rule tables and the weeks to
/// settle. Fed to the in-memory store by the `rakeback` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub rule_tables: Vec<RuleTable>,
    pub clubs: Vec<ClubProfile>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
    #[serde(default)]
    pub weeks: Vec<ClubWeek>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClubWeek {
    pub club_id: String,
    /// Explicit Monday of the week. Takes precedence over `played_at`.
    #[serde(default)]
    pub week_start: Option<NaiveDate>,
    #[serde(default)]
    pub played_at: Option<DateTime<Utc>>,
    pub entries: Vec<WeekEntry>,
}

impl ClubWeek {
    pub fn resolve_week_start(&self, tz: Tz) -> NaiveDate {
        match (self.week_start, self.played_at) {
            (Some(start), _) => {
                if !week::is_week_start(start) {
                    warn!("Week start {} for club {} is not a Monday", start, self.club_id);
                }
                start
            }
            (None, Some(at)) => week::week_start(at, tz),
            (None, None) => week::week_start(Utc::now(), tz),
        }
    }
}

impl Scenario {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub async fn load_into(&self, store: &InMemoryStore) -> Result<()> {
        for table in &self.rule_tables {
            let issues = store
                .insert_table(table.clone())
                .await
                .with_context(|| format!("loading rule table {}", table.id))?;
            info!("Loaded rule table {} ({} warnings)", table.id, issues.len());
        }
        for club in &self.clubs {
            store.upsert_club(club.clone()).await;
        }
        for membership in &self.memberships {
            store.upsert_membership(membership.clone()).await;
        }
        Ok(())
    }

    /// Zone a club's weeks are cut in: the club's own, else `fallback`.
    pub fn club_timezone(&self, club_id: &str, fallback: Tz) -> Tz {
        self.clubs
            .iter()
            .find(|c| c.club_id == club_id)
            .and_then(|c| c.timezone.as_deref())
            .map(parse_timezone)
            .unwrap_or(fallback)
    }
}
