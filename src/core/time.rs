//! Duration parsing and formatting.
//!
//! Durations use the compact unit-suffixed form familiar from etcd tooling:
//! `500ms`, `2s`, `1m30s`, `1h`. A bare `0` means zero.

use std::time::Duration;

/// Parse a unit-suffixed duration string.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .ok_or_else(|| format!("missing unit in duration {:?}", input))?;
        if digits == 0 {
            return Err(format!("invalid duration {:?}", input));
        }
        let value: f64 = rest[..digits]
            .parse()
            .map_err(|_| format!("invalid number in duration {:?}", input))?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit_nanos: f64 = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            unit => return Err(format!("unknown unit {:?} in duration {:?}", unit, input)),
        };
        rest = &rest[unit_len..];

        let nanos = (value * unit_nanos).round();
        if nanos >= u64::MAX as f64 {
            return Err(format!("duration {:?} out of range", input));
        }
        total = total
            .checked_add(Duration::from_nanos(nanos as u64))
            .filter(|d| d.as_nanos() <= u64::MAX as u128)
            .ok_or_else(|| format!("duration {:?} out of range", input))?;
    }

    Ok(total)
}

/// Units emitted by `format_duration`, largest first.
const UNITS: [(&str, u128); 6] = [
    ("h", 3_600_000_000_000),
    ("m", 60_000_000_000),
    ("s", 1_000_000_000),
    ("ms", 1_000_000),
    ("us", 1_000),
    ("ns", 1),
];

/// Format a duration in the same compact form `parse_duration` accepts.
///
/// Every non-zero unit is written, so no precision is lost: 90s is `1m30s`
/// and 1.0005s is `1s500us`.
pub fn format_duration(d: Duration) -> String {
    let mut remaining = d.as_nanos();
    if remaining == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    for (unit, nanos) in UNITS {
        let count = remaining / nanos;
        if count > 0 {
            out.push_str(&count.to_string());
            out.push_str(unit);
            remaining %= nanos;
        }
    }
    out
}
