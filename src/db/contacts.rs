use sqlx::PgPool;

use crate::submission::record::ContactRecord;

pub async fn insert(pool: &PgPool, contact: &ContactRecord) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO contacts (contact_id, name, email, subject, message, created_at)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(contact.id.as_str())
    .bind(&contact.name)
    .bind(&contact.email)
    .bind(&contact.subject)
    .bind(&contact.message)
    .bind(contact.created_at)
    .fetch_one(pool)
    .await
}
