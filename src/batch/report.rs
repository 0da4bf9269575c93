use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::batch::runner::EntryOutcome;
use crate::core::format::{format_amount, format_percentage, format_ratio};
use crate::core::week::week_bounds;
use crate::models::{SettlementResult, WeeklyPlayStats};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerLine {
    pub membership_id: String,
    pub player_id: String,
    pub agent_id: Option<String>,
    pub stats: WeeklyPlayStats,
    pub result: SettlementResult,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WeekTotals {
    pub rake: Decimal,
    pub action: Decimal,
    pub rake_available_for_split: Decimal,
    pub platform: Decimal,
    pub player: Decimal,
    pub agent: Decimal,
    pub platform_net: Decimal,
    pub player_total_adjustment: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedEntry {
    pub membership_id: String,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekReport {
    pub club_id: String,
    pub week_start: NaiveDate,
    pub lines: Vec<PlayerLine>,
    pub totals: WeekTotals,
    /// Memberships settled at 0% on some layer because no tier matched.
    pub unmatched: Vec<String>,
    pub duplicates: Vec<String>,
    pub failures: Vec<FailedEntry>,
}

impl WeekReport {
    pub fn from_outcomes(club_id: &str, week_start: NaiveDate, outcomes: &[EntryOutcome]) -> Self {
        let mut lines = Vec::new();
        let mut totals = WeekTotals::default();
        let mut unmatched = Vec::new();
        let mut duplicates = Vec::new();
        let mut failures = Vec::new();

        for outcome in outcomes {
            match outcome {
                EntryOutcome::Settled(record) => {
                    let r = &record.result;
                    totals.rake += record.stats.rake;
                    totals.action += r.action_amount;
                    totals.rake_available_for_split += r.rake_available_for_split;
                    totals.platform += r.platform_amount;
                    totals.player += r.player_amount;
                    totals.agent += r.agent_amount;
                    totals.platform_net += r.platform_net_profit;
                    totals.player_total_adjustment += r.player_total_adjustment();
                    if r.has_unmatched_tier() {
                        unmatched.push(record.key.membership_id.clone());
                    }
                    lines.push(PlayerLine {
                        membership_id: record.key.membership_id.clone(),
                        player_id: record.player_id.clone(),
                        agent_id: record.agent_id.clone(),
                        stats: record.stats.clone(),
                        result: r.clone(),
                    });
                }
                EntryOutcome::Duplicate { membership_id } => duplicates.push(membership_id.clone()),
                EntryOutcome::Failed {
                    membership_id,
                    code,
                    message,
                } => failures.push(FailedEntry {
                    membership_id: membership_id.clone(),
                    code: *code,
                    message: message.clone(),
                }),
            }
        }

        WeekReport {
            club_id: club_id.to_string(),
            week_start,
            lines,
            totals,
            unmatched,
            duplicates,
            failures,
        }
    }

    pub fn settled_count(&self) -> usize {
        self.lines.len()
    }

    pub fn print_summary(&self, symbol: &str) {
        let (first, last) = week_bounds(self.week_start);
        let money = |v: Decimal| format_amount(v, symbol);

        println!("\n{}", "=".repeat(70));
        println!("  SETTLEMENT REPORT");
        println!("{}", "=".repeat(70));
        println!("  Club:        {}", self.club_id);
        println!("  Week:        {} to {}", first, last);
        println!();
        println!("  TOTALS");
        println!("  ───────────────────────────────────");
        println!("  Rake:        {}", money(self.totals.rake));
        println!("  Action:      {}", money(self.totals.action));
        println!("  Split pool:  {}", money(self.totals.rake_available_for_split));
        println!("  Platform:    {}", money(self.totals.platform));
        println!("  Players:     {}", money(self.totals.player));
        println!("  Agents:      {}", money(self.totals.agent));
        println!("  Net:         {}", money(self.totals.platform_net));
        println!("  Owed to players (action + rakeback): {}", money(self.totals.player_total_adjustment));

        if !self.lines.is_empty() {
            println!();
            println!("  BY PLAYER");
            println!("  ───────────────────────────────────");
            for line in &self.lines {
                let r = &line.result;
                println!(
                    "  {:>10}: ratio {} | platform {} {} | player {} {} | agent {} | net {}",
                    line.membership_id,
                    format_ratio(r.ratio),
                    format_percentage(r.platform_percentage),
                    money(r.platform_amount),
                    format_percentage(r.player_percentage),
                    money(r.player_amount),
                    money(r.agent_amount),
                    money(r.platform_net_profit)
                );
            }
        }

        if !self.unmatched.is_empty() {
            println!();
            println!("  WARNING: no tier matched for {}", self.unmatched.join(", "));
        }
        if !self.duplicates.is_empty() {
            println!("  Already settled: {}", self.duplicates.join(", "));
        }
        for failure in &self.failures {
            println!("  FAILED {} [{}]: {}", failure.membership_id, failure.code, failure.message);
        }

        println!("{}", "=".repeat(70));
    }
}
