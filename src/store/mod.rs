pub mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::{RuleTable, TableIssue};
use crate::error::Result;
use crate::models::{ClubProfile, Membership, RatioRule, SettlementKey, SettlementRecord};

#[async_trait]
pub trait RuleTableStore: Send + Sync {
    async fn get_table(&self, table_id: &str) -> Result<RuleTable>;
    /// Delete-then-insert of a table's whole rule set as one unit.
    async fn replace_all_rules(&self, table_id: &str, rules: Vec<RatioRule>)
        -> Result<Vec<TableIssue>>;
}

#[async_trait]
pub trait AgreementStore: Send + Sync {
    async fn club_profile(&self, club_id: &str) -> Result<ClubProfile>;
    async fn memberships(&self, club_id: &str) -> Result<Vec<Membership>>;
    async fn membership(&self, membership_id: &str) -> Result<Membership>;
}

#[async_trait]
pub trait SettlementSink: Send + Sync {
    /// Rejects a second record for the same (membership, week start).
    async fn insert(&self, record: SettlementRecord) -> Result<()>;
    async fn get(&self, key: &SettlementKey) -> Result<Option<SettlementRecord>>;
    async fn list_week(&self, club_id: &str, week_start: NaiveDate)
        -> Result<Vec<SettlementRecord>>;
}
