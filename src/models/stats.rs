use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One player's play at one club over one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlayStats {
    /// Positive when the player won.
    pub profit_loss: Decimal,
    pub rake: Decimal,
    #[serde(default)]
    pub hands_played: u64,
    /// Club-level share of `profit_loss` settled through the action channel.
    #[serde(default)]
    pub action_percentage: Decimal,
}

impl WeeklyPlayStats {
    pub fn new(profit_loss: Decimal, rake: Decimal, hands_played: u64) -> Self {
        Self {
            profit_loss,
            rake,
            hands_played,
            action_percentage: Decimal::ZERO,
        }
    }

    pub fn with_action(mut self, action_percentage: Decimal) -> Self {
        self.action_percentage = action_percentage;
        self
    }

    /// `profit_loss / rake`, or zero when there is no rake.
    pub fn ratio(&self) -> Decimal {
        if self.rake > Decimal::ZERO {
            self.profit_loss / self.rake
        } else {
            Decimal::ZERO
        }
    }

    pub fn hands(&self) -> Decimal {
        Decimal::from(self.hands_played)
    }
}
