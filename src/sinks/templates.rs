use askama::Template;

use crate::submission::id::RecordId;
use crate::submission::record::{BookingRecord, ContactRecord, SubmissionRecord};

const SUBJECT_EXCERPT: usize = 60;

pub struct Notification {
    pub subject: String,
    pub html: String,
}

#[derive(Template)]
#[template(path = "email/contact.html")]
struct ContactEmail<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
    id: &'a RecordId,
    received: String,
}

#[derive(Template)]
#[template(path = "email/booking.html")]
struct BookingEmail<'a> {
    program: &'a str,
    date: &'a str,
    participants: u32,
    name: String,
    email: &'a str,
    phone: &'a str,
    requirements: &'a str,
    id: &'a RecordId,
    received: String,
}

pub fn render(record: &SubmissionRecord) -> Result<Notification, askama::Error> {
    match record {
        SubmissionRecord::Contact(c) => render_contact(c),
        SubmissionRecord::Booking(b) => render_booking(b),
    }
}

fn render_contact(c: &ContactRecord) -> Result<Notification, askama::Error> {
    let subject = format!("New Contact Form: {}", excerpt(&c.subject, SUBJECT_EXCERPT));
    let html = ContactEmail {
        name: &c.name,
        email: &c.email,
        subject: &c.subject,
        message: &c.message,
        id: &c.id,
        received: c.created_at.to_rfc2822(),
    }
    .render()?;
    Ok(Notification { subject, html })
}

fn render_booking(b: &BookingRecord) -> Result<Notification, askama::Error> {
    let subject = excerpt(
        &format!("New Booking: {} - {}", b.program, b.full_name()),
        SUBJECT_EXCERPT + "New Booking: ".len(),
    );
    let html = BookingEmail {
        program: &b.program,
        date: &b.date,
        participants: b.participants,
        name: b.full_name(),
        email: &b.email,
        phone: &b.phone,
        requirements: &b.special_requirements,
        id: &b.id,
        received: b.created_at.to_rfc2822(),
    }
    .render()?;
    Ok(Notification { subject, html })
}

/// First `max` characters, with an ellipsis when cut.
fn excerpt(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push('…');
    cut
}
