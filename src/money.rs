use thiserror::Error;

/// Why an amount string could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("unrecognized amount format: '{0}'")]
    Format(String),
}

/// Parse a human-formatted amount into signed integer cents.
///
/// Accepts a leading `-` or full parenthesis wrapping for negatives, a `$`
/// symbol and `,` separators anywhere, and one or more fractional digits.
/// Cents past the second fractional digit are dropped, never rounded.
/// All arithmetic is integer; currency never touches floating point.
pub fn parse_amount(raw: &str) -> Result<i64, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let stripped: String = trimmed.chars().filter(|c| *c != '$' && *c != ',').collect();
    let stripped = stripped.trim();

    // Parens and a leading minus are mutually exclusive negation triggers:
    // a parenthesized amount must be unsigned inside.
    let (body, negative) = if let Some(inner) = stripped
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
    {
        (inner.trim(), true)
    } else if let Some(rest) = stripped.strip_prefix('-') {
        (rest, true)
    } else {
        (stripped, false)
    };

    let (whole, frac) = match body.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (body, None),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::Format(raw.to_string()));
    }
    if let Some(f) = frac {
        if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::Format(raw.to_string()));
        }
    }

    let dollars: i64 = whole
        .parse()
        .map_err(|_| AmountError::Format(raw.to_string()))?;

    // A single fractional digit means tens of cents: ".5" is 50.
    let cents = match frac {
        None => 0,
        Some(f) => {
            let mut digits = f.bytes().map(|b| i64::from(b - b'0'));
            let tens = digits.next().unwrap_or(0);
            let ones = digits.next().unwrap_or(0);
            tens * 10 + ones
        }
    };

    let total = dollars * 100 + cents;
    Ok(if negative { -total } else { total })
}
