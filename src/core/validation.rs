use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::WeeklyPlayStats;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

pub fn validate_percentage(value: Decimal, field: &'static str) -> Result<(), ValidationError> {
    if value < Decimal::ZERO || value > HUNDRED {
        return Err(ValidationError::PercentageOutOfRange { field, value });
    }
    Ok(())
}

/// Ingestion-side checks. The calculator trusts its input and never calls this.
pub fn validate_stats(stats: &WeeklyPlayStats) -> Result<(), ValidationError> {
    if stats.rake < Decimal::ZERO {
        return Err(ValidationError::NegativeRake(stats.rake));
    }
    validate_percentage(stats.action_percentage, "action_percentage")
}

pub fn validate_agent_commission(commission: Option<Decimal>) -> Result<(), ValidationError> {
    match commission {
        Some(value) => validate_percentage(value, "agent_commission_percentage"),
        None => Ok(()),
    }
}
