/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Parse a cumulative count cell. Accepts `"12"` and `"12.0"`; fractional
/// values truncate toward zero. Blank or non-numeric cells are `None`.
pub fn parse_count(raw: &str) -> Option<i64> {
    let s = clean_str(raw);
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
}

/// Parse a population cell; negative values are treated as missing.
pub fn parse_population(raw: &str) -> Option<u64> {
    parse_count(raw).and_then(|v| u64::try_from(v).ok())
}

/// Parse a finite float cell (coordinates).
pub fn parse_float(raw: &str) -> Option<f64> {
    clean_str(raw)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Empty cells become `None`, everything else an owned, cleaned string.
pub fn parse_text(raw: &str) -> Option<String> {
    let s = clean_str(raw);
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
