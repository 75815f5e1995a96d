use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};

use super::id::RecordId;
use super::record::{BookingRecord, ContactRecord, RecordKind, SubmissionRecord};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

const CONTACT_REQUIRED: &[&str] = &["name", "email", "subject", "message"];
const BOOKING_REQUIRED: &[&str] = &["program", "date", "firstName", "lastName", "email"];

const PHONE_DEFAULT: &str = "Not provided";
const REQUIREMENTS_DEFAULT: &str = "None";

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingFields(Vec<&'static str>),
    InvalidEmail,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingFields(fields) => {
                write!(f, "Please fill in all required fields: {}", fields.join(", "))
            }
            ValidationError::InvalidEmail => write!(f, "Please enter a valid email address"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Validate and normalize a raw form body into a typed record stamped with the current time.
pub fn validate(
    raw: &Map<String, Value>,
    kind: RecordKind,
) -> Result<SubmissionRecord, ValidationError> {
    validate_at(raw, kind, Utc::now())
}

pub fn validate_at(
    raw: &Map<String, Value>,
    kind: RecordKind,
    now: DateTime<Utc>,
) -> Result<SubmissionRecord, ValidationError> {
    let required = match kind {
        RecordKind::Contact => CONTACT_REQUIRED,
        RecordKind::Booking => BOOKING_REQUIRED,
    };

    let missing: Vec<&'static str> = required
        .iter()
        .copied()
        .filter(|field| text(raw, field).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let email = text(raw, "email").unwrap_or_default().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }

    let id = RecordId::mint(kind, now);

    let record = match kind {
        RecordKind::Contact => SubmissionRecord::Contact(ContactRecord {
            name: text(raw, "name").unwrap_or_default(),
            email,
            subject: text(raw, "subject").unwrap_or_default(),
            message: text(raw, "message").unwrap_or_default(),
            created_at: now,
            id,
        }),
        RecordKind::Booking => SubmissionRecord::Booking(BookingRecord {
            program: text(raw, "program").unwrap_or_default(),
            date: text(raw, "date").unwrap_or_default(),
            participants: participants(raw.get("participants")),
            first_name: text(raw, "firstName").unwrap_or_default(),
            last_name: text(raw, "lastName").unwrap_or_default(),
            email,
            phone: text(raw, "phone").unwrap_or_else(|| PHONE_DEFAULT.to_string()),
            special_requirements: text(raw, "specialRequirements")
                .unwrap_or_else(|| REQUIREMENTS_DEFAULT.to_string()),
            created_at: now,
            id,
        }),
    };

    Ok(record)
}

/// Trimmed text of a string or number field; `None` for anything else or blank.
fn text(raw: &Map<String, Value>, field: &str) -> Option<String> {
    let value = match raw.get(field)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!value.is_empty()).then_some(value)
}

/// Participant count, never below one.
fn participants(value: Option<&Value>) -> u32 {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    };

    parsed
        .map(|n| n.clamp(1, u32::MAX as i64) as u32)
        .unwrap_or(1)
}
