// ── Validation layer ──
//
// Decodes untyped transport responses into typed records and checks
// outbound payloads before they leave the process. Structural checks
// come from serde (`deny_unknown_fields` on strict schemas); value
// rules (e-mail shape, time-of-day format) come from `Schema::issues`.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

/// One field-level validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Location of the field, e.g. `[2].email`. Empty for the root.
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    fn nested(self, prefix: &str) -> Self {
        let path = if self.path.is_empty() {
            prefix.to_owned()
        } else if self.path.starts_with('[') {
            format!("{prefix}{}", self.path)
        } else {
            format!("{prefix}.{}", self.path)
        };
        Self { path, ..self }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// A payload that violated its schema.
///
/// Carries the offending payload, the schema it was checked against, and
/// the context label of the call that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeFailure {
    pub schema: &'static str,
    pub context: String,
    pub payload: Value,
    pub issues: Vec<FieldIssue>,
}

impl DecodeFailure {
    fn new(schema: &'static str, context: &str, payload: &Value, issues: Vec<FieldIssue>) -> Self {
        Self {
            schema,
            context: context.to_owned(),
            payload: payload.clone(),
            issues,
        }
    }

    /// Emit the structured failure at error level.
    pub fn log(&self) {
        error!(
            schema = self.schema,
            context = %self.context,
            issues = ?self.issues,
            payload = %self.payload,
            "payload does not match schema"
        );
    }
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} does not match the {} schema", self.context, self.schema)?;
        if let Some(first) = self.issues.first() {
            write!(f, " ({first}")?;
            if self.issues.len() > 1 {
                write!(f, ", {} more", self.issues.len() - 1)?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl std::error::Error for DecodeFailure {}

// ── Schema traits ────────────────────────────────────────────────────

/// An inbound record shape.
pub trait Schema: DeserializeOwned + Serialize {
    const NAME: &'static str;

    /// Value rules beyond what deserialization enforces.
    fn issues(&self) -> Vec<FieldIssue> {
        Vec::new()
    }
}

/// An outbound request body.
pub trait Payload: Serialize {
    const NAME: &'static str;

    fn issues(&self) -> Vec<FieldIssue> {
        Vec::new()
    }
}

// ── Decoding ─────────────────────────────────────────────────────────

/// Decode a single record. Failures are logged.
pub fn decode<T: Schema>(raw: &Value, context: &str) -> Result<T, DecodeFailure> {
    validate(raw, context).inspect_err(DecodeFailure::log)
}

/// Decode a single record without logging a failure.
///
/// For callers that may still recover from a mismatch.
pub fn validate<T: Schema>(raw: &Value, context: &str) -> Result<T, DecodeFailure> {
    let value = check_one::<T>(raw)
        .map_err(|issues| DecodeFailure::new(T::NAME, context, raw, issues))?;
    note_drift(&value, raw, context);
    Ok(value)
}

/// Decode a collection.
///
/// A sequence whose elements are all null or empty objects is an empty
/// collection; some backends answer "nothing" that way.
pub fn decode_list<T: Schema>(raw: &Value, context: &str) -> Result<Vec<T>, DecodeFailure> {
    let Value::Array(items) = raw else {
        let failure = DecodeFailure::new(
            T::NAME,
            context,
            raw,
            vec![FieldIssue::new("", format!("expected a sequence, got {}", kind_of(raw)))],
        );
        failure.log();
        return Err(failure);
    };

    if items.iter().all(is_meaningless) {
        if !items.is_empty() {
            debug!(context, count = items.len(), "sequence of empty elements decoded as empty");
        }
        return Ok(Vec::new());
    }

    let mut records = Vec::with_capacity(items.len());
    let mut issues = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match check_one::<T>(item) {
            Ok(record) => records.push(record),
            Err(found) => {
                let prefix = format!("[{index}]");
                issues.extend(found.into_iter().map(|issue| issue.nested(&prefix)));
            }
        }
    }

    if !issues.is_empty() {
        let failure = DecodeFailure::new(T::NAME, context, raw, issues);
        failure.log();
        return Err(failure);
    }

    if let Ok(reencoded) = serde_json::to_value(&records) {
        if reencoded != *raw {
            debug!(context, "decoded collection differs from raw payload");
        }
    }
    Ok(records)
}

/// Validate an outbound payload and serialize it.
pub fn encode_payload<P: Payload>(payload: &P, context: &str) -> Result<Value, DecodeFailure> {
    let value = serde_json::to_value(payload).map_err(|e| {
        DecodeFailure::new(P::NAME, context, &Value::Null, vec![FieldIssue::new("", e.to_string())])
    })?;

    let issues = payload.issues();
    if issues.is_empty() {
        Ok(value)
    } else {
        let failure = DecodeFailure::new(P::NAME, context, &value, issues);
        failure.log();
        Err(failure)
    }
}

/// `null`, or an object with no fields.
pub fn is_meaningless(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn check_one<T: Schema>(raw: &Value) -> Result<T, Vec<FieldIssue>> {
    let value = T::deserialize(raw).map_err(|e| vec![FieldIssue::new("", e.to_string())])?;
    let issues = value.issues();
    if issues.is_empty() {
        Ok(value)
    } else {
        Err(issues)
    }
}

fn note_drift<T: Serialize>(value: &T, raw: &Value, context: &str) {
    if let Ok(reencoded) = serde_json::to_value(value) {
        if reencoded != *raw {
            debug!(context, "decoded value differs from raw payload");
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "an object",
    }
}

// ── Value rules ──────────────────────────────────────────────────────

/// Accumulates value-rule violations for a record.
#[derive(Debug, Default)]
pub(crate) struct Issues(Vec<FieldIssue>);

impl Issues {
    pub(crate) fn check(&mut self, ok: bool, path: &str, message: &str) -> &mut Self {
        if !ok {
            self.0.push(FieldIssue::new(path, message));
        }
        self
    }

    pub(crate) fn email(&mut self, path: &str, value: &str) -> &mut Self {
        self.check(is_email(value), path, "invalid email")
    }

    pub(crate) fn time_of_day(&mut self, path: &str, value: &str) -> &mut Self {
        self.check(is_time_of_day(value), path, "must be formatted HH:MM:SS")
    }

    pub(crate) fn nested(&mut self, prefix: &str, found: Vec<FieldIssue>) -> &mut Self {
        self.0.extend(found.into_iter().map(|issue| issue.nested(prefix)));
        self
    }

    pub(crate) fn finish(&mut self) -> Vec<FieldIssue> {
        std::mem::take(&mut self.0)
    }
}

/// Loose e-mail shape: `local@domain.tld`, no whitespace.
pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !value.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// `HH:MM:SS` with hours 00-23.
pub fn is_time_of_day(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 8 || bytes[2] != b':' || bytes[5] != b':' {
        return false;
    }
    let field = |at: usize| -> Option<u8> {
        let pair = value.get(at..at + 2)?;
        if pair.bytes().all(|b| b.is_ascii_digit()) {
            pair.parse().ok()
        } else {
            None
        }
    };
    matches!(
        (field(0), field(3), field(6)),
        (Some(h), Some(m), Some(s)) if h < 24 && m < 60 && s < 60
    )
}

/// An ISO datetime in UTC with a literal `Z` suffix.
pub fn is_utc_datetime(value: &str) -> bool {
    value.ends_with('Z') && chrono::DateTime::parse_from_rfc3339(value).is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Probe {
        id: i64,
        email: String,
    }

    impl Schema for Probe {
        const NAME: &'static str = "Probe";

        fn issues(&self) -> Vec<FieldIssue> {
            Issues::default().email("email", &self.email).finish()
        }
    }

    #[test]
    fn null_and_empty_elements_decode_as_empty() {
        let none: Vec<Probe> = decode_list(&json!([]), "Probe.getAll").unwrap();
        assert!(none.is_empty());
        let none: Vec<Probe> = decode_list(&json!([null, {}, null]), "Probe.getAll").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn list_issues_carry_index() {
        let raw = json!([{ "id": 1, "email": "a@b.io" }, { "id": 2, "email": "nope" }]);
        let failure = decode_list::<Probe>(&raw, "Probe.getAll").unwrap_err();
        assert_eq!(failure.context, "Probe.getAll");
        assert_eq!(failure.schema, "Probe");
        assert_eq!(failure.issues, vec![FieldIssue::new("[1].email", "invalid email")]);
        assert_eq!(failure.payload, raw);
    }

    #[test]
    fn mixed_null_and_record_is_a_failure() {
        let raw = json!([null, { "id": 1, "email": "a@b.io" }]);
        let failure = decode_list::<Probe>(&raw, "ctx").unwrap_err();
        assert_eq!(failure.issues.len(), 1);
        assert!(failure.issues[0].path.starts_with("[0]"));
    }

    #[test]
    fn object_is_not_a_sequence() {
        let failure = decode_list::<Probe>(&json!({ "items": [] }), "ctx").unwrap_err();
        assert!(failure.issues[0].message.contains("an object"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let raw = json!({ "id": 1, "email": "a@b.io", "extra": true });
        assert!(decode::<Probe>(&raw, "ctx").is_err());
    }

    #[test]
    fn failure_display_summarizes_issues() {
        let failure = DecodeFailure::new(
            "Probe",
            "ProbeAPI.update.response",
            &json!({ "foo": 1 }),
            vec![FieldIssue::new("", "missing field `id`"), FieldIssue::new("email", "x")],
        );
        assert_eq!(
            failure.to_string(),
            "ProbeAPI.update.response does not match the Probe schema (missing field `id`, 1 more)"
        );
    }

    #[test]
    fn email_rule() {
        assert!(is_email("jane.doe@corp.example"));
        assert!(!is_email("jane.doe@corp"));
        assert!(!is_email("@corp.example"));
        assert!(!is_email("jane doe@corp.example"));
        assert!(!is_email("a@b@c.io"));
    }

    #[test]
    fn time_of_day_rule() {
        assert!(is_time_of_day("00:00:00"));
        assert!(is_time_of_day("23:59:59"));
        assert!(!is_time_of_day("24:00:00"));
        assert!(!is_time_of_day("9:00:00"));
        assert!(!is_time_of_day("09:60:00"));
        assert!(!is_time_of_day("09-00-00"));
    }

    #[test]
    fn utc_datetime_rule() {
        assert!(is_utc_datetime("2025-11-26T00:00:00Z"));
        assert!(is_utc_datetime("2025-11-26T00:00:00.000Z"));
        assert!(!is_utc_datetime("2025-11-26T00:00:00+01:00"));
        assert!(!is_utc_datetime("2025-11-26"));
    }
}
