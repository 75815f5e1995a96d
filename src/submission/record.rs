use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::id::RecordId;

/// Constant `source` tag attached to every outbound storage payload.
pub const SOURCE: &str = "bestie.co.ke";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Contact,
    Booking,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Contact => "contact",
            RecordKind::Booking => "booking",
        }
    }

    pub fn id_prefix(self) -> &'static str {
        match self {
            RecordKind::Contact => "contact",
            RecordKind::Booking => "book",
        }
    }

    /// Key under which the id travels in payloads and responses.
    pub fn id_field(self) -> &'static str {
        match self {
            RecordKind::Contact => "contactId",
            RecordKind::Booking => "bookingId",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(rename = "timestamp", serialize_with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "contactId")]
    pub id: RecordId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub program: String,
    pub date: String,
    pub participants: u32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub special_requirements: String,
    #[serde(rename = "timestamp", serialize_with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "bookingId")]
    pub id: RecordId,
}

impl BookingRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SubmissionRecord {
    Contact(ContactRecord),
    Booking(BookingRecord),
}

impl SubmissionRecord {
    pub fn id(&self) -> &RecordId {
        match self {
            SubmissionRecord::Contact(c) => &c.id,
            SubmissionRecord::Booking(b) => &b.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            SubmissionRecord::Contact(c) => &c.email,
            SubmissionRecord::Booking(b) => &b.email,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            SubmissionRecord::Contact(c) => c.created_at,
            SubmissionRecord::Booking(b) => b.created_at,
        }
    }
}

/// A validated record together with its storage payload, shared read-only by every sink.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub record: SubmissionRecord,
    pub payload: Value,
}

impl Envelope {
    pub fn new(record: SubmissionRecord) -> Result<Self, serde_json::Error> {
        let mut payload = serde_json::to_value(&record)?;
        match payload.as_object_mut() {
            Some(obj) => {
                obj.insert("source".to_string(), Value::String(SOURCE.to_string()));
            }
            None => {
                return Err(serde::ser::Error::custom("record did not serialize to an object"));
            }
        }
        Ok(Envelope { record, payload })
    }
}

fn iso_millis<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn booking() -> SubmissionRecord {
        let at = Utc.timestamp_millis_opt(1_718_000_000_123).unwrap();
        SubmissionRecord::Booking(BookingRecord {
            program: "bestie".into(),
            date: "2025-01-01".into(),
            participants: 2,
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.com".into(),
            phone: "Not provided".into(),
            special_requirements: "None".into(),
            created_at: at,
            id: RecordId::mint(RecordKind::Booking, at),
        })
    }

    #[test]
    fn booking_payload_is_tagged_and_camel_cased() {
        let envelope = Envelope::new(booking()).unwrap();
        let p = &envelope.payload;
        assert_eq!(p["type"], "booking");
        assert_eq!(p["source"], SOURCE);
        assert_eq!(p["firstName"], "A");
        assert_eq!(p["lastName"], "B");
        assert_eq!(p["specialRequirements"], "None");
        assert_eq!(p["participants"], 2);
        assert_eq!(p["bookingId"], "book_1718000000123");
        assert_eq!(p["timestamp"], "2024-06-10T06:13:20.123Z");
    }

    #[test]
    fn contact_payload_carries_contact_id() {
        let at = Utc::now();
        let record = SubmissionRecord::Contact(ContactRecord {
            name: "Ann".into(),
            email: "ann@x.com".into(),
            subject: "Hi".into(),
            message: "Hello".into(),
            created_at: at,
            id: RecordId::mint(RecordKind::Contact, at),
        });
        let envelope = Envelope::new(record).unwrap();
        assert_eq!(envelope.payload["type"], "contact");
        assert_eq!(envelope.payload["contactId"], envelope.record.id().as_str());
        assert!(envelope.payload.get("bookingId").is_none());
    }
}
