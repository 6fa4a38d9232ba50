// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Timestamp formatting for API responses.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 with second precision and a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Like [`format_utc_rfc3339`], for timestamps that may be unset.
pub fn format_optional_rfc3339(date: Option<DateTime<Utc>>) -> Option<String> {
    date.map(format_utc_rfc3339)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn drops_subseconds() {
        let date = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap()
            + chrono::Duration::milliseconds(535);
        assert_eq!(format_utc_rfc3339(date), "2026-03-14T15:09:26Z");
    }

    #[test]
    fn optional_passes_none_through() {
        assert_eq!(format_optional_rfc3339(None), None);
    }
}
