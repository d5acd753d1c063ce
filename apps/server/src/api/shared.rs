use chrono::NaiveDate;

use crate::error::ApiError;

/// Parses a `YYYY-MM-DD` query or path value.
pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| ApiError::BadRequest(format!("Invalid {}: {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates_and_rejects_garbage() {
        assert_eq!(
            parse_date("2024-05-01", "date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        let err = parse_date("05/01/2024", "startDate").unwrap_err();
        assert!(err.to_string().starts_with("Invalid startDate"));
    }
}
