//! Bid amount parsing
//!
//! Accepts a plain integer (`10000000`) or a decimal followed by `M`
//! for millions (`10M`, `2.5m`). The decimal form is parsed exactly;
//! digits past the sixth decimal place are dropped.

use thiserror::Error;

use crate::types::Amount;

const MILLION: Amount = 1_000_000;
/// Decimal places that still map to whole units under the `M` suffix
const MILLION_DIGITS: usize = 6;

/// Why a bid amount could not be read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BidParseError {
    #[error("No bid amount given")]
    Empty,

    #[error("Not a bid amount: {0}")]
    Invalid(String),

    #[error("Bid amount too large: {0}")]
    Overflow(String),
}

/// Parse the amount token of a bid command
pub fn parse_amount(token: &str) -> Result<Amount, BidParseError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(BidParseError::Empty);
    }

    let Some(millions) = token.strip_suffix(['M', 'm']) else {
        return parse_digits(token, token);
    };

    let millions = millions.trim();
    let (whole, fraction) = millions.split_once('.').unwrap_or((millions, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(BidParseError::Invalid(token.to_string()));
    }

    let whole = if whole.is_empty() {
        0
    } else {
        parse_digits(whole, token)?
    };
    let fraction = parse_fraction(fraction, token)?;

    whole
        .checked_mul(MILLION)
        .and_then(|units| units.checked_add(fraction))
        .ok_or_else(|| BidParseError::Overflow(token.to_string()))
}

fn parse_digits(digits: &str, token: &str) -> Result<Amount, BidParseError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BidParseError::Invalid(token.to_string()));
    }
    digits
        .parse()
        .map_err(|_| BidParseError::Overflow(token.to_string()))
}

/// Fractional millions as whole units (`"5"` -> `500_000`)
fn parse_fraction(digits: &str, token: &str) -> Result<Amount, BidParseError> {
    if digits.is_empty() {
        return Ok(0);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BidParseError::Invalid(token.to_string()));
    }

    let kept = &digits[..digits.len().min(MILLION_DIGITS)];
    let padded = format!("{:0<width$}", kept, width = MILLION_DIGITS);
    padded
        .parse()
        .map_err(|_| BidParseError::Invalid(token.to_string()))
}
