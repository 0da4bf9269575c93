use rust_decimal::Decimal;
use tracing::debug;

use crate::core::rule_table::RuleTable;
use crate::error::{Result, SettlementError};
use crate::models::{AgreementConfig, Resolution, SecondaryDimension};

/// Resolves the percentage an agreement grants for an observed ratio and
/// secondary volume.
///
/// `dimension` is what `secondary` measures. Fixed agreements ignore everything
/// else. Dynamic agreements need the table they reference, bounded by that same
/// dimension; a missing, different or wrongly-bounded table is a configuration
/// error, while a table with no matching tier resolves to an unmatched 0%.
pub fn resolve_percentage(
    config: &AgreementConfig,
    ratio: Decimal,
    secondary: Decimal,
    dimension: SecondaryDimension,
    table: Option<&RuleTable>,
) -> Result<Resolution> {
    match config {
        AgreementConfig::Fixed { percentage } => Ok(Resolution::fixed(*percentage)),
        AgreementConfig::Dynamic { rule_table_id } => {
            let table =
                table.ok_or_else(|| SettlementError::MissingRuleTable(rule_table_id.clone()))?;
            if &table.id != rule_table_id {
                return Err(SettlementError::RuleTableMismatch {
                    expected: rule_table_id.clone(),
                    actual: table.id.clone(),
                });
            }
            if table.dimension != dimension {
                return Err(SettlementError::DimensionMismatch {
                    table_id: table.id.clone(),
                    expected: dimension,
                    actual: table.dimension,
                });
            }
            let resolution = table.lookup(ratio, secondary);
            debug!(
                "Table {} ratio={} {}={} -> {}% ({})",
                table.id, ratio, table.dimension, secondary, resolution.percentage, resolution.source
            );
            Ok(resolution)
        }
    }
}
