use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Standalone contribution record; unrelated to users, carts, and orders.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Donation {
  pub id: Uuid,
  pub donor_name: String,
  pub donor_email: String,
  pub amount_cents: i64,
  pub message: Option<String>,
  pub donation_type: String,
  pub anonymous: bool,
  pub status: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
