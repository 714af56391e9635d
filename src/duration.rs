//! Duration-string parsing for `on_fail.delay` (spec.md §4.1.1): a positive
//! integer followed by a unit suffix (`ms`, `s`, `m`, `h`). No fractional
//! amounts, no combined units (`1h30m`) — the format is deliberately the
//! smallest thing that reads unambiguously in a YAML/JSON string.

use std::time::Duration;

/// Parses a duration string such as `"500ms"` or `"2s"`.
///
/// # Errors
///
/// Returns a human-readable message if `s` has no recognised unit suffix,
/// the numeric part does not parse, or the resulting duration is zero.
pub fn parse(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let unit_len = s
        .rfind(|c: char| c.is_ascii_digit())
        .map(|idx| s.len() - idx - 1)
        .ok_or_else(|| format!("'{s}' has no numeric amount"))?;
    if unit_len == 0 || unit_len > 2 {
        return Err(format!(
            "'{s}' must end in a unit suffix (ms, s, m, or h)"
        ));
    }
    let split_at = s.len() - unit_len;
    let (amount, unit) = s.split_at(split_at);
    let amount: u64 = amount
        .parse()
        .map_err(|_| format!("'{s}' has a non-integer amount"))?;
    let millis = match unit {
        "ms" => amount,
        "s" => amount.saturating_mul(1_000),
        "m" => amount.saturating_mul(60_000),
        "h" => amount.saturating_mul(3_600_000),
        other => return Err(format!("unrecognised duration unit '{other}' in '{s}'")),
    };
    if millis == 0 {
        return Err(format!("'{s}' must be a positive duration"));
    }
    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_milliseconds_and_seconds() {
        assert_eq!(parse("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn rejects_zero_and_missing_unit() {
        assert!(parse("0ms").is_err());
        assert!(parse("10").is_err());
        assert!(parse("10x").is_err());
    }
}
