use rust_decimal::Decimal;

use crate::core::resolver::resolve_percentage;
use crate::core::rule_table::RuleTable;
use crate::error::{Result, SettlementError};
use crate::models::{
    AgreementConfig, Resolution, SecondaryDimension, SettlementResult, WeeklyPlayStats,
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Settles one player-club-week.
///
/// The waterfall:
/// 1. ratio = profit_loss / rake (0 without rake)
/// 2. action = profit_loss * action%
/// 3. pool = rake * (1 - action%)
/// 4. platform% from the club agreement, bounded by rake volume
/// 5. platform = pool * platform%
/// 6. player% from the player agreement, bounded by hands played
/// 7. player = pool * player%
/// 8. agent = player * agent% (paid by the platform, never by the player)
/// 9. net = platform - player - agent
///
/// With no rake nothing is resolved and every amount is zero. Any step that
/// leaves the `Decimal` range fails with `SettlementError::Arithmetic`.
pub fn compute_settlement(
    stats: &WeeklyPlayStats,
    club_agreement: &AgreementConfig,
    player_agreement: &AgreementConfig,
    agent_commission_percentage: Option<Decimal>,
    club_table: Option<&RuleTable>,
    player_table: Option<&RuleTable>,
) -> Result<SettlementResult> {
    let agent_pct = agent_commission_percentage
        .filter(|p| *p > Decimal::ZERO)
        .unwrap_or(Decimal::ZERO);

    if stats.rake <= Decimal::ZERO {
        return Ok(zero_rake(agent_pct));
    }

    let ratio = checked(stats.profit_loss.checked_div(stats.rake), "ratio")?;
    let action_share = checked(stats.action_percentage.checked_div(HUNDRED), "action share")?;
    let action_amount = checked(stats.profit_loss.checked_mul(action_share), "action")?;
    let pool = checked(
        Decimal::ONE
            .checked_sub(action_share)
            .and_then(|kept| stats.rake.checked_mul(kept)),
        "split pool",
    )?;

    let platform = resolve_percentage(
        club_agreement,
        ratio,
        stats.rake,
        SecondaryDimension::RakeVolume,
        club_table,
    )?;
    let platform_amount = share_of(pool, platform.percentage, "platform share")?;

    let player = resolve_percentage(
        player_agreement,
        ratio,
        stats.hands(),
        SecondaryDimension::HandsPlayed,
        player_table,
    )?;
    let player_amount = share_of(pool, player.percentage, "player share")?;

    let agent_amount = if agent_pct > Decimal::ZERO {
        share_of(player_amount, agent_pct, "agent commission")?
    } else {
        Decimal::ZERO
    };

    let platform_net_profit = checked(
        platform_amount
            .checked_sub(player_amount)
            .and_then(|v| v.checked_sub(agent_amount)),
        "platform net",
    )?;

    Ok(SettlementResult {
        ratio,
        action_amount,
        rake_available_for_split: pool,
        player_percentage: player.percentage,
        player_amount,
        platform_percentage: platform.percentage,
        platform_amount,
        agent_commission_percentage: agent_pct,
        agent_amount,
        platform_net_profit,
        platform_resolution: platform.source,
        player_resolution: player.source,
    })
}

fn checked(value: Option<Decimal>, step: &'static str) -> Result<Decimal> {
    value.ok_or(SettlementError::Arithmetic { step })
}

/// `amount * percentage / 100`
fn share_of(amount: Decimal, percentage: Decimal, step: &'static str) -> Result<Decimal> {
    checked(
        amount
            .checked_mul(percentage)
            .and_then(|v| v.checked_div(HUNDRED)),
        step,
    )
}

fn zero_rake(agent_pct: Decimal) -> SettlementResult {
    let skipped = Resolution::skipped();
    SettlementResult {
        ratio: Decimal::ZERO,
        action_amount: Decimal::ZERO,
        rake_available_for_split: Decimal::ZERO,
        player_percentage: skipped.percentage,
        player_amount: Decimal::ZERO,
        platform_percentage: skipped.percentage,
        platform_amount: Decimal::ZERO,
        agent_commission_percentage: agent_pct,
        agent_amount: Decimal::ZERO,
        platform_net_profit: Decimal::ZERO,
        platform_resolution: skipped.source,
        player_resolution: skipped.source,
    }
}
