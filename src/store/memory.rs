use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::core::{Coverage, RuleTable, TableIssue};
use crate::error::{Result, SettlementError};
use crate::models::{ClubProfile, Membership, RatioRule, SettlementKey, SettlementRecord};
use crate::store::{AgreementStore, RuleTableStore, SettlementSink};

/// Rule tables, agreements and settlements held in process memory.
/// Backs the CLI and the test suite.
#[derive(Default)]
pub struct InMemoryStore {
    coverage: Coverage,
    tables: RwLock<HashMap<String, RuleTable>>,
    clubs: RwLock<HashMap<String, ClubProfile>>,
    memberships: RwLock<HashMap<String, Membership>>,
    settlements: RwLock<BTreeMap<SettlementKey, SettlementRecord>>,
}

impl InMemoryStore {
    /// Store that only accepts tables covering their whole ratio domain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that accepts gapped tables, logging the gaps instead.
    pub fn allowing_gaps() -> Self {
        Self {
            coverage: Coverage::Advisory,
            ..Self::default()
        }
    }

    pub fn coverage(&self) -> Coverage {
        self.coverage
    }

    /// Adds or replaces a table after the same checks `replace_all_rules` runs.
    pub async fn insert_table(&self, mut table: RuleTable) -> Result<Vec<TableIssue>> {
        let rules = table.rules().to_vec();
        let issues = table.replace_all_rules(rules, self.coverage)?;
        debug!("Stored rule table {} ({} rules)", table.id, table.rules().len());
        self.tables.write().await.insert(table.id.clone(), table);
        Ok(issues)
    }

    pub async fn upsert_club(&self, club: ClubProfile) {
        self.clubs.write().await.insert(club.club_id.clone(), club);
    }

    pub async fn upsert_membership(&self, membership: Membership) {
        self.memberships
            .write()
            .await
            .insert(membership.membership_id.clone(), membership);
    }

    pub async fn settlement_count(&self) -> usize {
        self.settlements.read().await.len()
    }
}

#[async_trait]
impl RuleTableStore for InMemoryStore {
    async fn get_table(&self, table_id: &str) -> Result<RuleTable> {
        self.tables
            .read()
            .await
            .get(table_id)
            .cloned()
            .ok_or_else(|| SettlementError::not_found("rule table", table_id))
    }

    async fn replace_all_rules(
        &self,
        table_id: &str,
        rules: Vec<RatioRule>,
    ) -> Result<Vec<TableIssue>> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_id)
            .ok_or_else(|| SettlementError::not_found("rule table", table_id))?;
        let issues = table.replace_all_rules(rules, self.coverage)?;
        info!(
            "Replaced rules of table {} ({} rules, {} warnings)",
            table_id,
            table.rules().len(),
            issues.len()
        );
        Ok(issues)
    }
}

#[async_trait]
impl AgreementStore for InMemoryStore {
    async fn club_profile(&self, club_id: &str) -> Result<ClubProfile> {
        self.clubs
            .read()
            .await
            .get(club_id)
            .cloned()
            .ok_or_else(|| SettlementError::not_found("club", club_id))
    }

    async fn memberships(&self, club_id: &str) -> Result<Vec<Membership>> {
        let mut out: Vec<Membership> = self
            .memberships
            .read()
            .await
            .values()
            .filter(|m| m.club_id == club_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.membership_id.cmp(&b.membership_id));
        Ok(out)
    }

    async fn membership(&self, membership_id: &str) -> Result<Membership> {
        self.memberships
            .read()
            .await
            .get(membership_id)
            .cloned()
            .ok_or_else(|| SettlementError::not_found("membership", membership_id))
    }
}

#[async_trait]
impl SettlementSink for InMemoryStore {
    async fn insert(&self, record: SettlementRecord) -> Result<()> {
        let mut settlements = self.settlements.write().await;
        if settlements.contains_key(&record.key) {
            return Err(SettlementError::DuplicateSettlement {
                membership_id: record.key.membership_id.clone(),
                week_start: record.key.week_start,
            });
        }
        settlements.insert(record.key.clone(), record);
        Ok(())
    }

    async fn get(&self, key: &SettlementKey) -> Result<Option<SettlementRecord>> {
        Ok(self.settlements.read().await.get(key).cloned())
    }

    async fn list_week(&self, club_id: &str, week_start: NaiveDate) -> Result<Vec<SettlementRecord>> {
        Ok(self
            .settlements
            .read()
            .await
            .values()
            .filter(|r| r.club_id == club_id && r.key.week_start == week_start)
            .cloned()
            .collect())
    }
}
