use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::models::domain::WorkerRecord;

/// Request body for the monthly status check
///
/// ```json
/// {
///   "period": { "month": "6", "year": "2024" },
///   "chws": [
///     { "NationalIdentificationNumber": "A1", "OpenmrsProviderId": "P100" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MonthlyStatusRequest {
    #[validate(nested)]
    pub period: PeriodPayload,
    #[serde(default)]
    pub chws: Vec<WorkerRecord>,
}

/// Period as sent on the wire; month and year arrive as strings or numbers
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PeriodPayload {
    #[validate(length(min = 1))]
    #[serde(deserialize_with = "string_or_number")]
    pub month: String,
    #[validate(length(min = 1))]
    #[serde(deserialize_with = "string_or_number")]
    pub year: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_string_period() {
        let req: MonthlyStatusRequest = serde_json::from_str(
            r#"{"period":{"month":"6","year":"2024"},"chws":[{"NationalIdentificationNumber":"A1","OpenmrsProviderId":"P100"}]}"#,
        )
        .unwrap();

        assert_eq!(req.period.month, "6");
        assert_eq!(req.period.year, "2024");
        assert_eq!(req.chws, vec![WorkerRecord::new("A1", "P100")]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_accepts_numeric_period_and_missing_chws() {
        let req: MonthlyStatusRequest =
            serde_json::from_str(r#"{"period":{"month":12,"year":2024}}"#).unwrap();

        assert_eq!(req.period.month, "12");
        assert_eq!(req.period.year, "2024");
        assert!(req.chws.is_empty());
    }

    #[test]
    fn test_empty_month_fails_validation() {
        let req: MonthlyStatusRequest =
            serde_json::from_str(r#"{"period":{"month":"","year":"2024"},"chws":[]}"#).unwrap();

        assert!(req.validate().is_err());
    }
}
