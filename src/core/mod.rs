pub mod format;
pub mod resolver;
pub mod rule_table;
pub mod settlement;
pub mod validation;
pub mod week;

pub use resolver::resolve_percentage;
pub use rule_table::{Coverage, RuleTable, TableIssue};
pub use settlement::compute_settlement;
