pub mod report;
pub mod runner;

pub use report::WeekReport;
pub use runner::{EntryOutcome, SettlementRunner, WeekEntry};
