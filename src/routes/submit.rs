use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};

use crate::error::{AppError, SubmissionError};
use crate::state::SharedState;
use crate::submission::record::{RecordKind, SubmissionRecord};
use crate::submission::{metadata, parser, pipeline};

pub async fn contact(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, SubmissionError> {
    submit(&state, RecordKind::Contact, addr, &headers, body).await
}

pub async fn booking(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, SubmissionError> {
    submit(&state, RecordKind::Booking, addr, &headers, body).await
}

async fn submit(
    state: &SharedState,
    kind: RecordKind,
    addr: SocketAddr,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, SubmissionError> {
    let body = body.map_err(|rejection| SubmissionError::new(kind, body_rejection(rejection)))?;
    let raw = parser::parse(headers, body)
        .await
        .map_err(|e| SubmissionError::new(kind, AppError::BadRequest(e.to_string())))?;

    let client_ip = metadata::client_ip(headers, addr.ip(), &state.config.trusted_proxies);
    let accepted = pipeline::run(state, kind, client_ip, raw).await?;

    Ok(Json(accepted_body(&accepted)))
}

fn body_rejection(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

fn accepted_body(accepted: &pipeline::Accepted) -> Value {
    match &accepted.envelope.record {
        SubmissionRecord::Contact(contact) => json!({
            "success": true,
            "message": "Thank you for your message! We'll get back to you soon.",
            "contactId": contact.id,
            "emailAttempted": accepted.email_attempted,
        }),
        SubmissionRecord::Booking(booking) => json!({
            "success": true,
            "message": "Booking request received! We'll contact you shortly to confirm.",
            "bookingId": booking.id,
            "emailAttempted": accepted.email_attempted,
            "details": {
                "program": booking.program,
                "date": booking.date,
                "participants": booking.participants,
                "name": booking.full_name(),
            },
        }),
    }
}
