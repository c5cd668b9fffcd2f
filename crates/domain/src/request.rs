//! Reservation request — one line of the input protocol, validated.
//!
//! Lines arrive as JSON objects, sometimes quoted with backticks instead of
//! double quotes by the upstream caller. [`parse_line`] repairs the quoting,
//! parses the document, and checks every field before handing out a typed
//! [`ReservationRequest`]. A partially valid request is never produced.

use serde_json::{Map, Value};

use crate::error::{
    FieldIssue, IssueReason, JsonKind, MalformedInputError, ReservationError, ValidationError,
};

/// Party size used when the request does not specify one.
pub const DEFAULT_PARTY_SIZE: u64 = 2;

/// A validated reservation request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    date: String,
    region: String,
    time_preference: String,
    search_term: String,
    party_size: u64,
}

impl ReservationRequest {
    /// Create a builder for constructing a [`ReservationRequest`].
    #[must_use]
    pub fn builder() -> ReservationRequestBuilder {
        ReservationRequestBuilder::default()
    }

    /// Validate an already-parsed JSON document.
    ///
    /// Unknown keys are ignored. An explicit `null` `party_size` counts as
    /// omitted.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every missing or invalid field.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let Some(object) = value.as_object() else {
            return Err(ValidationError::new(vec![FieldIssue::root(
                IssueReason::ExpectedObject {
                    received: JsonKind::of(value),
                },
            )]));
        };

        let mut issues = Vec::new();
        let date = required_text(object, "date", &mut issues);
        let region = required_text(object, "region", &mut issues);
        let time_preference = required_text(object, "time_preference", &mut issues);
        let search_term = required_text(object, "search_term", &mut issues);
        let party_size = optional_party_size(object.get("party_size"), &mut issues);

        match (date, region, time_preference, search_term, party_size) {
            (Some(date), Some(region), Some(time_preference), Some(search_term), Some(party_size))
                if issues.is_empty() =>
            {
                Ok(Self {
                    date,
                    region,
                    time_preference,
                    search_term,
                    party_size,
                })
            }
            _ => Err(ValidationError::new(issues)),
        }
    }

    /// Requested calendar date, as received (`YYYY-MM-DD` expected).
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[must_use]
    pub fn time_preference(&self) -> &str {
        &self.time_preference
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    #[must_use]
    pub fn party_size(&self) -> u64 {
        self.party_size
    }
}

/// Parse one raw protocol line into a validated request.
///
/// Every backtick is replaced with a double quote before parsing.
///
/// # Errors
///
/// - [`ReservationError::MalformedInput`] when the repaired line is not JSON
/// - [`ReservationError::Validation`] when the document fails the schema
pub fn parse_line(line: &str) -> Result<ReservationRequest, ReservationError> {
    let repaired = line.replace('`', "\"");
    let document: Value =
        serde_json::from_str(&repaired).map_err(|source| MalformedInputError {
            raw: line.to_string(),
            source,
        })?;
    Ok(ReservationRequest::from_value(&document)?)
}

fn required_text(
    object: &Map<String, Value>,
    field: &'static str,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    match object.get(field) {
        None => {
            issues.push(FieldIssue::new(field, IssueReason::Required));
            None
        }
        Some(Value::String(text)) if text.is_empty() => {
            issues.push(FieldIssue::new(field, IssueReason::EmptyString));
            None
        }
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            issues.push(FieldIssue::new(
                field,
                IssueReason::ExpectedString {
                    received: JsonKind::of(other),
                },
            ));
            None
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn optional_party_size(value: Option<&Value>, issues: &mut Vec<FieldIssue>) -> Option<u64> {
    const FIELD: &str = "party_size";

    let number = match value {
        None | Some(Value::Null) => return Some(DEFAULT_PARTY_SIZE),
        Some(Value::Number(number)) => number,
        Some(other) => {
            issues.push(FieldIssue::new(
                FIELD,
                IssueReason::ExpectedNumber {
                    received: JsonKind::of(other),
                },
            ));
            return None;
        }
    };

    if let Some(size) = number.as_u64() {
        if size == 0 {
            issues.push(FieldIssue::new(FIELD, IssueReason::NotPositive));
            return None;
        }
        return Some(size);
    }
    if number.is_i64() {
        issues.push(FieldIssue::new(FIELD, IssueReason::NotPositive));
        return None;
    }

    // Floats: integral values are accepted, like any JSON number would be.
    let float = number.as_f64().unwrap_or(f64::NAN);
    let integral = float.fract() == 0.0;
    if !integral {
        issues.push(FieldIssue::new(FIELD, IssueReason::ExpectedInteger));
    }
    if float.is_nan() || float <= 0.0 {
        issues.push(FieldIssue::new(FIELD, IssueReason::NotPositive));
        return None;
    }
    if !integral {
        return None;
    }
    if float >= u64::MAX as f64 {
        issues.push(FieldIssue::new(FIELD, IssueReason::TooBig));
        return None;
    }
    Some(float as u64)
}

/// Step-by-step builder for [`ReservationRequest`].
#[derive(Debug, Default)]
pub struct ReservationRequestBuilder {
    date: Option<String>,
    region: Option<String>,
    time_preference: Option<String>,
    search_term: Option<String>,
    party_size: Option<u64>,
}

impl ReservationRequestBuilder {
    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn time_preference(mut self, time_preference: impl Into<String>) -> Self {
        self.time_preference = Some(time_preference.into());
        self
    }

    #[must_use]
    pub fn search_term(mut self, search_term: impl Into<String>) -> Self {
        self.search_term = Some(search_term.into());
        self
    }

    #[must_use]
    pub fn party_size(mut self, party_size: u64) -> Self {
        self.party_size = Some(party_size);
        self
    }

    /// Consume the builder, validate, and return a [`ReservationRequest`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] with the same rules as [`parse_line`].
    pub fn build(self) -> Result<ReservationRequest, ValidationError> {
        let mut object = Map::new();
        let fields = [
            ("date", self.date),
            ("region", self.region),
            ("time_preference", self.time_preference),
            ("search_term", self.search_term),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                object.insert(key.to_string(), Value::String(value));
            }
        }
        if let Some(size) = self.party_size {
            object.insert("party_size".to_string(), Value::from(size));
        }
        ReservationRequest::from_value(&Value::Object(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_LINE: &str = r#"{"date":"2024-04-27","region":"SoHo, New York","time_preference":"around 7 PM","search_term":"Italian food"}"#;

    #[test]
    fn should_parse_valid_line_with_default_party_size() {
        let request = parse_line(VALID_LINE).unwrap();
        assert_eq!(request.date(), "2024-04-27");
        assert_eq!(request.region(), "SoHo, New York");
        assert_eq!(request.time_preference(), "around 7 PM");
        assert_eq!(request.search_term(), "Italian food");
        assert_eq!(request.party_size(), DEFAULT_PARTY_SIZE);
    }

    #[test]
    fn should_accept_backtick_quoted_line() {
        let line = "{`date`:`2024-04-27`,`region`:`SoHo`,`time_preference`:`8 PM`,`search_term`:`Nobu`,`party_size`:4}";
        let request = parse_line(line).unwrap();
        assert_eq!(request.search_term(), "Nobu");
        assert_eq!(request.party_size(), 4);
    }

    #[test]
    fn should_return_malformed_input_when_line_is_not_json() {
        let err = parse_line("book me a table").unwrap_err();
        match err {
            ReservationError::MalformedInput(inner) => assert_eq!(inner.raw, "book me a table"),
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn should_keep_unrepaired_line_in_malformed_input() {
        let err = parse_line("{`date`: oops}").unwrap_err();
        assert!(err.to_string().ends_with("Raw input: {`date`: oops}"));
    }

    #[test]
    fn should_report_every_missing_field() {
        let err = parse_line(r#"{"region":"SoHo"}"#).unwrap_err();
        let ReservationError::Validation(validation) = err else {
            panic!("expected validation error");
        };
        assert_eq!(validation.issues.len(), 3);
        assert!(validation.concerns("date"));
        assert!(validation.concerns("time_preference"));
        assert!(validation.concerns("search_term"));
        assert_eq!(
            validation.to_string(),
            "Invalid input parameters: date (Required), time_preference (Required), search_term (Required)"
        );
    }

    #[test]
    fn should_reject_zero_party_size() {
        let value = serde_json::json!({
            "date": "2024-04-27", "region": "SoHo", "time_preference": "7 PM",
            "search_term": "Nobu", "party_size": 0
        });
        let err = ReservationRequest::from_value(&value).unwrap_err();
        assert_eq!(
            err.issues,
            vec![FieldIssue::new("party_size", IssueReason::NotPositive)]
        );
    }

    #[test]
    fn should_reject_negative_party_size() {
        let value = serde_json::json!({
            "date": "2024-04-27", "region": "SoHo", "time_preference": "7 PM",
            "search_term": "Nobu", "party_size": -3
        });
        let err = ReservationRequest::from_value(&value).unwrap_err();
        assert!(err.concerns("party_size"));
    }

    #[test]
    fn should_reject_fractional_party_size() {
        let value = serde_json::json!({
            "date": "2024-04-27", "region": "SoHo", "time_preference": "7 PM",
            "search_term": "Nobu", "party_size": 2.5
        });
        let err = ReservationRequest::from_value(&value).unwrap_err();
        assert_eq!(
            err.issues,
            vec![FieldIssue::new("party_size", IssueReason::ExpectedInteger)]
        );
    }

    #[test]
    fn should_report_both_issues_for_negative_fraction() {
        let value = serde_json::json!({
            "date": "2024-04-27", "region": "SoHo", "time_preference": "7 PM",
            "search_term": "Nobu", "party_size": -1.5
        });
        let err = ReservationRequest::from_value(&value).unwrap_err();
        assert_eq!(err.issues.len(), 2);
    }

    #[test]
    fn should_accept_integral_float_party_size() {
        let value = serde_json::json!({
            "date": "2024-04-27", "region": "SoHo", "time_preference": "7 PM",
            "search_term": "Nobu", "party_size": 6.0
        });
        let request = ReservationRequest::from_value(&value).unwrap();
        assert_eq!(request.party_size(), 6);
    }

    #[test]
    fn should_name_party_size_when_it_overflows() {
        let line = r#"{"date":"2024-04-27","region":"SoHo","time_preference":"7 PM","search_term":"Nobu","party_size":1e20}"#;
        let ReservationError::Validation(err) = parse_line(line).unwrap_err() else {
            panic!("expected a validation error");
        };
        assert_eq!(
            err.issues,
            vec![FieldIssue::new("party_size", IssueReason::TooBig)]
        );
        assert_eq!(
            err.to_string(),
            "Invalid input parameters: party_size (Number must be less than or equal to 18446744073709551615)"
        );
    }

    #[test]
    fn should_treat_null_party_size_as_omitted() {
        let value = serde_json::json!({
            "date": "2024-04-27", "region": "SoHo", "time_preference": "7 PM",
            "search_term": "Nobu", "party_size": null
        });
        let request = ReservationRequest::from_value(&value).unwrap();
        assert_eq!(request.party_size(), 2);
    }

    #[test]
    fn should_reject_empty_and_mistyped_text_fields_together() {
        let value = serde_json::json!({
            "date": "", "region": 12, "time_preference": "7 PM",
            "search_term": "Nobu", "party_size": "four"
        });
        let err = ReservationRequest::from_value(&value).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input parameters: date (String must contain at least 1 character(s)), \
             region (Expected string, received number), \
             party_size (Expected number, received string)"
        );
    }

    #[test]
    fn should_reject_non_object_document() {
        let err = parse_line(r#"["2024-04-27"]"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input parameters: (root) (Expected object, received array)"
        );
    }

    #[test]
    fn should_ignore_unknown_keys() {
        let value = serde_json::json!({
            "date": "2024-04-27", "region": "SoHo", "time_preference": "7 PM",
            "search_term": "Nobu", "notes": "window seat"
        });
        assert!(ReservationRequest::from_value(&value).is_ok());
    }

    #[test]
    fn should_build_request_with_builder() {
        let request = ReservationRequest::builder()
            .date("2024-04-27")
            .region("SoHo")
            .time_preference("7 PM")
            .search_term("Nobu")
            .party_size(3)
            .build()
            .unwrap();
        assert_eq!(request.party_size(), 3);
    }

    #[test]
    fn should_fail_builder_when_fields_missing() {
        let err = ReservationRequest::builder().region("SoHo").build().unwrap_err();
        assert_eq!(err.issues.len(), 3);
    }
}
