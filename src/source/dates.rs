use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Report-date headers: `M/D/YY` (the published format) or `M/D/YYYY`.
static DATE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/(\d{2}|\d{4})$").expect("static regex"));

/// Fast parse of `"M/D/YY"` → `NaiveDate`. Two-digit years are 20YY.
pub fn parse_report_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if !DATE_HEADER.is_match(s) {
        return None;
    }
    let mut parts = s.split('/');
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    let year_str = parts.next()?;
    let year: i32 = year_str.parse().ok()?;
    let year = if year_str.len() == 2 { 2000 + year } else { year };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Days since the Unix epoch, as Arrow's `Date32` stores them.
pub fn to_epoch_days(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - 719_163
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_published_format() {
        assert_eq!(
            parse_report_date("1/22/20"),
            NaiveDate::from_ymd_opt(2020, 1, 22)
        );
        assert_eq!(
            parse_report_date("12/31/21"),
            NaiveDate::from_ymd_opt(2021, 12, 31)
        );
        assert_eq!(
            parse_report_date("3/9/2023"),
            NaiveDate::from_ymd_opt(2023, 3, 9)
        );
    }

    #[test]
    fn rejects_identity_headers_and_bad_dates() {
        assert_eq!(parse_report_date("Admin2"), None);
        assert_eq!(parse_report_date("FIPS"), None);
        assert_eq!(parse_report_date("2/30/20"), None);
        assert_eq!(parse_report_date("13/1/20"), None);
    }

    #[test]
    fn epoch_days() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(to_epoch_days(epoch), 0);
        let d = NaiveDate::from_ymd_opt(2020, 1, 22).unwrap();
        assert_eq!(to_epoch_days(d), 18_283);
    }
}
