//! Derived-metric arithmetic shared by every table.
//!
//! All rates go through [`safe_div`]: a zero, missing or non-finite
//! denominator yields `0.0`, never NaN or infinity.

/// People per `pop_factor` unit for county tables.
pub const PER_1000: f64 = 1_000.0;
/// People per `pop_factor` unit for state and national tables.
pub const PER_100K: f64 = 100_000.0;

/// `num / den`, or `0.0` when the quotient is not finite.
pub fn safe_div(num: f64, den: f64) -> f64 {
    let q = num / den;
    if q.is_finite() {
        q
    } else {
        0.0
    }
}

/// Round half-to-even at `places` decimals.
pub fn round_dp(v: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    let r = (v * factor).round_ties_even() / factor;
    if r.is_finite() {
        r
    } else {
        v
    }
}

/// `Death Rate (%)`: `100 * deaths / confirmed`.
pub fn death_rate(deaths: i64, confirmed: i64, places: u32) -> f64 {
    round_dp(100.0 * safe_div(deaths as f64, confirmed as f64), places)
}

/// `Confirmed Infection Rate (%)`: `100 * confirmed / population`.
pub fn infection_rate(confirmed: i64, population: Option<u64>, places: u32) -> f64 {
    let pop = population.unwrap_or(0) as f64;
    round_dp(100.0 * safe_div(confirmed as f64, pop), places)
}

/// Population expressed in units of `per` people; missing counts as 0.
pub fn pop_factor(population: Option<u64>, per: f64) -> f64 {
    population.unwrap_or(0) as f64 / per
}

/// `count` per `per` people, e.g. cases per 1000.
pub fn per_capita(count: i64, population: Option<u64>, per: f64, places: u32) -> f64 {
    round_dp(safe_div(count as f64, pop_factor(population, per)), places)
}

/// `1234567` → `"1,234,567"`.
pub fn format_thousands(v: i64) -> String {
    let digits = v.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if v < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Percentage display: two decimals, trailing zeros dropped but one kept,
/// then `%`. `1.7894` → `"1.79%"`, `2.0` → `"2.0%"`.
pub fn format_percent(v: f64) -> String {
    let mut s = format!("{:.2}", round_dp(v, 2));
    while s.ends_with('0') && !s.ends_with(".0") {
        s.pop();
    }
    s.push('%');
    s
}
