use async_trait::async_trait;
use sqlx::PgPool;

use super::{Sink, SinkError};
use crate::db;
use crate::submission::record::{Envelope, SubmissionRecord};

/// Mirrors submissions into the local `contacts` and `bookings` tables.
pub struct ArchiveSink {
    pool: PgPool,
}

impl ArchiveSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Sink for ArchiveSink {
    fn name(&self) -> &str {
        "archive"
    }

    async fn deliver(&self, envelope: &Envelope) -> Result<String, SinkError> {
        let row = match &envelope.record {
            SubmissionRecord::Contact(contact) => db::contacts::insert(&self.pool, contact).await,
            SubmissionRecord::Booking(booking) => {
                db::bookings::insert(&self.pool, booking, &envelope.payload).await
            }
        };

        match row {
            Ok(id) => Ok(format!("archived as row {id}")),
            Err(sqlx::Error::PoolTimedOut) => {
                Err(SinkError::Timeout("database pool timed out".to_string()))
            }
            Err(e) => Err(SinkError::Transport(format!("database error: {e}"))),
        }
    }
}
