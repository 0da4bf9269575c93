use rust_decimal::{Decimal, RoundingStrategy};

/// Money and percentages are stored with two decimals; halves go to even.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// `R$ 1,234.56`, `-R$ 80.00`
pub fn format_amount(value: Decimal, symbol: &str) -> String {
    let rounded = round2(value);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{}{} {}.{}", sign, symbol, group_thousands(int_part), frac_part)
}

pub fn format_percentage(value: Decimal) -> String {
    format!("{:.2}%", round2(value))
}

pub fn format_ratio(value: Decimal) -> String {
    format!(
        "{:.4}",
        value.round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven)
    )
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
