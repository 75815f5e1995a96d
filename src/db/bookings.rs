use sqlx::PgPool;

use crate::submission::record::BookingRecord;

pub async fn insert(
    pool: &PgPool,
    booking: &BookingRecord,
    payload: &serde_json::Value,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO bookings (booking_id, program, date, participants, first_name, last_name,
                               email, phone, special_requirements, payload, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING id",
    )
    .bind(booking.id.as_str())
    .bind(&booking.program)
    .bind(&booking.date)
    .bind(i64::from(booking.participants))
    .bind(&booking.first_name)
    .bind(&booking.last_name)
    .bind(&booking.email)
    .bind(&booking.phone)
    .bind(&booking.special_requirements)
    .bind(payload)
    .bind(booking.created_at)
    .fetch_one(pool)
    .await
}
