//! Practicum status API — response model, validation and verdicts.
//!
//! The raw reply is decoded into a `serde_json::Value` by the client and
//! checked here in two steps: [`check_response`] validates the envelope and
//! picks the newest homework, [`parse_status`] turns that homework into the
//! notification text.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::PollError;

pub mod client;

// ── Core Types ──────────────────────────────────────────────────────

/// One homework entry, kept as the raw mapping so that missing keys can be
/// reported individually.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeworkRecord(pub Map<String, Value>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

/// Status string → verdict sentence. Matching is exact and case-sensitive.
pub static HOMEWORK_VERDICTS: &[(&str, &str)] = &[
    ("approved", "The work has been reviewed: the reviewer liked everything. Hooray!"),
    ("reviewing", "The work has been taken for review."),
    ("rejected", "The work has been reviewed: the reviewer left comments."),
];

impl HomeworkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    pub fn verdict(self) -> &'static str {
        HOMEWORK_VERDICTS
            .iter()
            .find(|(key, _)| *key == self.as_str())
            .map(|(_, verdict)| *verdict)
            .unwrap_or_default()
    }
}

impl FromStr for HomeworkStatus {
    type Err = PollError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "approved" => Ok(Self::Approved),
            "reviewing" => Ok(Self::Reviewing),
            "rejected" => Ok(Self::Rejected),
            other => Err(PollError::UnexpectedStatus(other.to_string())),
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Source Trait ────────────────────────────────────────────────────

/// Anything that can answer a status query for a time window.
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    /// Fetch every status change since `from_date` (Unix seconds).
    /// Returns the decoded body untouched; shape checks happen later.
    async fn get_api_answer(&self, from_date: i64) -> Result<Value, PollError>;
}

// ── Validation ──────────────────────────────────────────────────────

/// Validate the envelope and return the first (newest) homework.
///
/// Checks run in a fixed order and stop at the first violation: mapping,
/// `homeworks` present, `current_date` present, `homeworks` is a list.
/// Only element 0 is inspected further; the type of `current_date` is left
/// to [`current_date`].
pub fn check_response(response: Value) -> Result<HomeworkRecord, PollError> {
    let mut map = match response {
        Value::Object(map) => map,
        _ => return Err(PollError::NotAMapping("API response")),
    };
    let homeworks = map.remove("homeworks").ok_or(PollError::MissingKey("homeworks"))?;
    if !map.contains_key("current_date") {
        return Err(PollError::MissingKey("current_date"));
    }
    let Value::Array(homeworks) = homeworks else {
        return Err(PollError::NotASequence("homeworks"));
    };

    match homeworks.into_iter().next() {
        None => Err(PollError::EmptyHomeworks),
        Some(Value::Object(record)) => Ok(HomeworkRecord(record)),
        Some(other) => Err(PollError::InvalidField {
            field: "homeworks[0]",
            reason: format!("expected a mapping, got {other}"),
        }),
    }
}

/// `current_date` of a reply, if present and integral.
pub fn current_date(response: &Value) -> Option<i64> {
    response.get("current_date")?.as_i64()
}

/// Build the notification text for one homework.
pub fn parse_status(record: &HomeworkRecord) -> Result<String, PollError> {
    let name = record.0.get("homework_name").ok_or(PollError::MissingKey("homework_name"))?;
    let status = record.0.get("status").ok_or(PollError::MissingKey("status"))?;

    let name = name.as_str().ok_or_else(|| PollError::InvalidField {
        field: "homework_name",
        reason: format!("expected a string, got {name}"),
    })?;
    let status: HomeworkStatus = match status.as_str() {
        Some(s) => s.parse()?,
        None => return Err(PollError::UnexpectedStatus(status.to_string())),
    };

    Ok(format!("Status check changed for \"{name}\". {}", status.verdict()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> HomeworkRecord {
        match v {
            Value::Object(map) => HomeworkRecord(map),
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_check_response_order() {
        assert!(matches!(
            check_response(json!([{"homeworks": []}])),
            Err(PollError::NotAMapping(_))
        ));
        assert!(matches!(check_response(json!("text")), Err(PollError::NotAMapping(_))));
        // Both keys missing: homeworks is reported first.
        assert!(matches!(check_response(json!({})), Err(PollError::MissingKey("homeworks"))));
        assert!(matches!(
            check_response(json!({"homeworks": "x"})),
            Err(PollError::MissingKey("current_date"))
        ));
        assert!(matches!(
            check_response(json!({"homeworks": {"a": 1}, "current_date": 1})),
            Err(PollError::NotASequence("homeworks"))
        ));
    }

    #[test]
    fn test_check_response_returns_first() {
        let rec = check_response(json!({
            "homeworks": [
                {"homework_name": "proj2", "status": "reviewing"},
                {"homework_name": "proj1", "status": "approved"}
            ],
            "current_date": 1700000000
        }))
        .unwrap();
        assert_eq!(rec, record(json!({"homework_name": "proj2", "status": "reviewing"})));
    }

    #[test]
    fn test_check_response_empty_list() {
        let err = check_response(json!({"homeworks": [], "current_date": 1700000000})).unwrap_err();
        assert!(matches!(err, PollError::EmptyHomeworks));
    }

    #[test]
    fn test_check_response_first_element_must_be_mapping() {
        assert!(matches!(
            check_response(json!({"homeworks": [1], "current_date": 1})),
            Err(PollError::InvalidField { field: "homeworks[0]", .. })
        ));
    }

    #[test]
    fn test_check_response_ignores_rest_and_date_type() {
        let first = json!({"homework_name": "proj1", "status": "approved"});

        // Later elements are not inspected.
        let rec =
            check_response(json!({"homeworks": [first.clone(), 5], "current_date": 1})).unwrap();
        assert_eq!(rec, record(first.clone()));

        // current_date only has to be present.
        for date in [json!(null), json!("today"), json!(1.5)] {
            let rec = check_response(json!({"homeworks": [first.clone()], "current_date": date}))
                .unwrap();
            assert_eq!(rec, record(first.clone()));
        }
        assert!(matches!(
            check_response(json!({"homeworks": [], "current_date": "today"})),
            Err(PollError::EmptyHomeworks)
        ));
    }

    #[test]
    fn test_current_date() {
        assert_eq!(current_date(&json!({"current_date": 1700000000})), Some(1700000000));
        assert_eq!(current_date(&json!({"current_date": "x"})), None);
        assert_eq!(current_date(&json!([])), None);
    }

    #[test]
    fn test_parse_status_approved() {
        let rec = record(json!({"homework_name": "proj1", "status": "approved"}));
        let text = parse_status(&rec).unwrap();
        assert_eq!(
            text,
            format!("Status check changed for \"proj1\". {}", HomeworkStatus::Approved.verdict())
        );
        // Same input, same output.
        assert_eq!(parse_status(&rec).unwrap(), text);
    }

    #[test]
    fn test_parse_status_missing_keys() {
        assert!(matches!(
            parse_status(&record(json!({"status": "approved"}))),
            Err(PollError::MissingKey("homework_name"))
        ));
        assert!(matches!(
            parse_status(&record(json!({"homework_name": "p"}))),
            Err(PollError::MissingKey("status"))
        ));
    }

    #[test]
    fn test_parse_status_rejects_unknown() {
        for bad in ["", "Approved", "APPROVED", "done", " approved"] {
            let rec = record(json!({"homework_name": "p", "status": bad}));
            match parse_status(&rec) {
                Err(PollError::UnexpectedStatus(v)) => assert_eq!(v, bad),
                other => panic!("{bad:?} gave {other:?}"),
            }
        }
        let rec = record(json!({"homework_name": "p", "status": 3}));
        assert!(matches!(parse_status(&rec), Err(PollError::UnexpectedStatus(_))));
    }

    #[test]
    fn test_status_table_roundtrip() {
        assert_eq!(HOMEWORK_VERDICTS.len(), 3);
        for (key, verdict) in HOMEWORK_VERDICTS {
            let status: HomeworkStatus = key.parse().unwrap();
            assert_eq!(status.as_str(), *key);
            assert_eq!(status.verdict(), *verdict);
        }
    }
}
