use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// How money is rendered in generated text (insights, tips, chat replies).
///
/// This never changes stored or JSON numeric values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoneyFormat {
    /// Round to this many decimal places (half away from zero).
    pub currency_decimals: Option<u32>,
    /// Insert thousands separators.
    pub currency_grouping: bool,
    /// Optional prefix such as "$" or "€".
    pub currency_symbol: Option<String>,
    /// With `currency_decimals`, pad to exactly that many places.
    pub currency_fixed_decimals: bool,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            currency_decimals: Some(2),
            currency_grouping: true,
            currency_symbol: Some("$".to_string()),
            currency_fixed_decimals: true,
        }
    }
}

impl MoneyFormat {
    pub fn format(&self, value: Decimal) -> String {
        format_money(
            value,
            self.currency_decimals,
            self.currency_grouping,
            self.currency_symbol.as_deref(),
            self.currency_fixed_decimals,
        )
    }

    /// Whole units only, for headline figures ("$1,240").
    pub fn format_whole(&self, value: Decimal) -> String {
        format_money(
            value,
            Some(0),
            self.currency_grouping,
            self.currency_symbol.as_deref(),
            false,
        )
    }
}

fn group_int_digits(int_part: &str) -> String {
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        out.push(ch);
        let remaining = len.saturating_sub(i + 1);
        if remaining > 0 && remaining % 3 == 0 {
            out.push(',');
        }
    }
    out
}

fn pad_fraction_to_dp(s: &str, dp: u32) -> String {
    if dp == 0 {
        return s
            .split_once('.')
            .map(|(i, _)| i.to_string())
            .unwrap_or_else(|| s.to_string());
    }

    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    let mut out = String::with_capacity(int_part.len() + 1 + dp as usize);
    out.push_str(int_part);
    out.push('.');

    let mut written = 0usize;
    for ch in frac_part.chars().take(dp as usize) {
        out.push(ch);
        written += 1;
    }
    while written < dp as usize {
        out.push('0');
        written += 1;
    }
    out
}

fn group_number_string(s: &str) -> String {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    let grouped = group_int_digits(int_part);
    match frac_part {
        Some(f) if !f.is_empty() => format!("{grouped}.{f}"),
        _ => grouped,
    }
}

/// Format a money value for display. The sign precedes the symbol ("-$4.50").
pub fn format_money(
    value: Decimal,
    currency_decimals: Option<u32>,
    currency_grouping: bool,
    currency_symbol: Option<&str>,
    currency_fixed_decimals: bool,
) -> String {
    let rounded = match currency_decimals {
        Some(dp) => value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        None => value,
    };

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();

    let mut s = abs.normalize().to_string();
    if currency_fixed_decimals {
        if let Some(dp) = currency_decimals {
            s = pad_fraction_to_dp(&s, dp);
        }
    }
    if currency_grouping {
        s = group_number_string(&s);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if let Some(sym) = currency_symbol {
        out.push_str(sym);
    }
    out.push_str(&s);
    out
}

/// Render a ratio already expressed in percent ("37%").
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    format!("{}%", rounded.normalize())
}
