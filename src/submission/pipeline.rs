use std::net::IpAddr;
use std::sync::Arc;

use crate::dispatch;
use crate::error::{AppError, SubmissionError};
use crate::state::SharedState;

use super::parser::RawForm;
use super::record::{Envelope, RecordKind};
use super::validate;

pub struct Accepted {
    pub envelope: Arc<Envelope>,
    pub email_attempted: bool,
}

/// Validate a raw form, fan it out to every configured sink and wait for them to settle.
///
/// Sink failures never surface here; only rate limiting, validation and envelope
/// construction can reject a submission.
pub async fn run(
    state: &SharedState,
    kind: RecordKind,
    client_ip: IpAddr,
    raw: RawForm,
) -> Result<Accepted, SubmissionError> {
    if let Err(retry_after) = state.limiter.check(kind, client_ip) {
        tracing::warn!(form = kind.as_str(), %client_ip, "Submission rate limited");
        return Err(SubmissionError::new(kind, AppError::RateLimited(retry_after)));
    }

    let record = validate::validate(&raw, kind).map_err(|e| {
        tracing::debug!(form = kind.as_str(), %client_ip, "Rejected submission: {e}");
        SubmissionError::new(kind, e)
    })?;
    let id = record.id().clone();

    let envelope = Envelope::new(record).map_err(|e| {
        SubmissionError::new(kind, AppError::Internal(format!("failed to encode {id}: {e}")))
            .with_id(id.clone())
    })?;
    let envelope = Arc::new(envelope);

    tracing::info!(
        form = kind.as_str(),
        %id,
        sinks = ?state.sinks.names(),
        "Dispatching submission"
    );

    let results = dispatch::dispatch(
        Arc::clone(&envelope),
        &state.sinks,
        state.config.dispatch_deadline,
    )
    .await;

    for result in &results {
        if result.ok {
            tracing::info!(%id, sink = %result.sink, "Sink delivered: {}", result.detail);
        } else {
            tracing::warn!(%id, sink = %result.sink, "Sink failed: {}", result.detail);
        }
    }

    Ok(Accepted {
        envelope,
        email_attempted: state.sinks.contains("email"),
    })
}
