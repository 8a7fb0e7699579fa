use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, FieldErrors, Result};
use crate::models::Donation;
use crate::state::AppState;
use crate::validation;

const DONATION_COLUMNS: &str = "id, donor_name, donor_email, amount_cents, message, donation_type, \
                                anonymous, status, created_at, updated_at";

#[derive(Deserialize, Debug)]
pub struct CreateDonationPayload {
  pub donor_name: String,
  pub donor_email: String,
  pub amount_cents: i64,
  pub message: Option<String>,
  pub donation_type: String,
  #[serde(default)]
  pub anonymous: bool,
  pub status: Option<String>,
}

impl CreateDonationPayload {
  pub fn validate(&self) -> Result<()> {
    let mut errors = FieldErrors::new();
    validation::required(&mut errors, "donor_name", &self.donor_name);
    validation::max_len(&mut errors, "donor_name", &self.donor_name, 255);
    validation::required(&mut errors, "donor_email", &self.donor_email);
    validation::email(&mut errors, "donor_email", &self.donor_email);
    validation::max_len(&mut errors, "donor_email", &self.donor_email, 255);
    validation::min_i64(&mut errors, "amount_cents", self.amount_cents, 1);
    validation::required(&mut errors, "donation_type", &self.donation_type);
    validation::max_len(&mut errors, "donation_type", &self.donation_type, 255);
    errors.into_result()
  }
}

#[derive(Deserialize, Debug)]
pub struct UpdateDonationPayload {
  pub donor_name: Option<String>,
  pub donor_email: Option<String>,
  pub amount_cents: Option<i64>,
  // Nullable columns: an explicit JSON null clears the stored value.
  #[serde(default, deserialize_with = "super::double_option")]
  pub message: Option<Option<String>>,
  pub donation_type: Option<String>,
  pub anonymous: Option<bool>,
  #[serde(default, deserialize_with = "super::double_option")]
  pub status: Option<Option<String>>,
}

impl UpdateDonationPayload {
  fn validate(&self) -> Result<()> {
    let mut errors = FieldErrors::new();
    if let Some(donor_name) = &self.donor_name {
      validation::required(&mut errors, "donor_name", donor_name);
      validation::max_len(&mut errors, "donor_name", donor_name, 255);
    }
    if let Some(donor_email) = &self.donor_email {
      validation::email(&mut errors, "donor_email", donor_email);
      validation::max_len(&mut errors, "donor_email", donor_email, 255);
    }
    if let Some(amount_cents) = self.amount_cents {
      validation::min_i64(&mut errors, "amount_cents", amount_cents, 1);
    }
    if let Some(donation_type) = &self.donation_type {
      validation::required(&mut errors, "donation_type", donation_type);
      validation::max_len(&mut errors, "donation_type", donation_type, 255);
    }
    errors.into_result()
  }
}

#[instrument(name = "handler::list_donations", skip_all)]
pub async fn list_donations_handler(app_state: web::Data<AppState>) -> Result<HttpResponse> {
  let donations: Vec<Donation> =
    sqlx::query_as(&format!("SELECT {DONATION_COLUMNS} FROM donations ORDER BY created_at DESC"))
      .fetch_all(&app_state.db_pool)
      .await?;
  Ok(HttpResponse::Ok().json(donations))
}

#[instrument(name = "handler::get_donation", skip(app_state, path), fields(donation_id = %path.as_ref()))]
pub async fn get_donation_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
  let donation_id = path.into_inner();
  let donation: Option<Donation> =
    sqlx::query_as(&format!("SELECT {DONATION_COLUMNS} FROM donations WHERE id = $1"))
      .bind(donation_id)
      .fetch_optional(&app_state.db_pool)
      .await?;

  match donation {
    Some(donation) => Ok(HttpResponse::Ok().json(donation)),
    None => Err(AppError::NotFound(format!("Donation with ID {donation_id} not found."))),
  }
}

#[instrument(name = "handler::create_donation", skip(app_state, payload))]
pub async fn create_donation_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateDonationPayload>,
) -> Result<HttpResponse> {
  payload.validate()?;

  let donation: Donation = sqlx::query_as(&format!(
    "INSERT INTO donations (id, donor_name, donor_email, amount_cents, message, donation_type, anonymous, status) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
     RETURNING {DONATION_COLUMNS}"
  ))
  .bind(Uuid::new_v4())
  .bind(&payload.donor_name)
  .bind(&payload.donor_email)
  .bind(payload.amount_cents)
  .bind(&payload.message)
  .bind(&payload.donation_type)
  .bind(payload.anonymous)
  .bind(&payload.status)
  .fetch_one(&app_state.db_pool)
  .await?;

  info!(donation_id = %donation.id, amount_cents = donation.amount_cents, "Donation recorded.");
  Ok(HttpResponse::Created().json(donation))
}

#[instrument(name = "handler::update_donation", skip(app_state, path, payload), fields(donation_id = %path.as_ref()))]
pub async fn update_donation_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateDonationPayload>,
) -> Result<HttpResponse> {
  let donation_id = path.into_inner();
  payload.validate()?;

  let current: Option<Donation> = sqlx::query_as(&format!("SELECT {DONATION_COLUMNS} FROM donations WHERE id = $1"))
    .bind(donation_id)
    .fetch_optional(&app_state.db_pool)
    .await?;
  let Some(mut donation) = current else {
    return Err(AppError::NotFound(format!("Donation with ID {donation_id} not found.")));
  };

  if let Some(donor_name) = &payload.donor_name {
    donation.donor_name = donor_name.clone();
  }
  if let Some(donor_email) = &payload.donor_email {
    donation.donor_email = donor_email.clone();
  }
  if let Some(amount_cents) = payload.amount_cents {
    donation.amount_cents = amount_cents;
  }
  if let Some(message) = &payload.message {
    donation.message = message.clone();
  }
  if let Some(donation_type) = &payload.donation_type {
    donation.donation_type = donation_type.clone();
  }
  if let Some(anonymous) = payload.anonymous {
    donation.anonymous = anonymous;
  }
  if let Some(status) = &payload.status {
    donation.status = status.clone();
  }

  let donation: Donation = sqlx::query_as(&format!(
    "UPDATE donations SET \
       donor_name = $2, donor_email = $3, amount_cents = $4, message = $5, \
       donation_type = $6, anonymous = $7, status = $8, updated_at = now() \
     WHERE id = $1 RETURNING {DONATION_COLUMNS}"
  ))
  .bind(donation_id)
  .bind(&donation.donor_name)
  .bind(&donation.donor_email)
  .bind(donation.amount_cents)
  .bind(&donation.message)
  .bind(&donation.donation_type)
  .bind(donation.anonymous)
  .bind(&donation.status)
  .fetch_one(&app_state.db_pool)
  .await?;

  Ok(HttpResponse::Ok().json(donation))
}

#[instrument(name = "handler::delete_donation", skip(app_state, path), fields(donation_id = %path.as_ref()))]
pub async fn delete_donation_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
  let donation_id = path.into_inner();
  let result = sqlx::query("DELETE FROM donations WHERE id = $1")
    .bind(donation_id)
    .execute(&app_state.db_pool)
    .await?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound(format!("Donation with ID {donation_id} not found.")));
  }
  Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn payload(amount_cents: i64) -> CreateDonationPayload {
    CreateDonationPayload {
      donor_name: "Asha Juma".to_string(),
      donor_email: "asha@example.com".to_string(),
      amount_cents,
      message: None,
      donation_type: "one-time".to_string(),
      anonymous: false,
      status: None,
    }
  }

  #[test]
  fn zero_and_negative_amounts_are_rejected() {
    for bad in [0, -100] {
      match payload(bad).validate() {
        Err(AppError::Validation(errors)) => assert!(errors.contains("amount_cents")),
        other => panic!("expected amount_cents field error, got {other:?}"),
      }
    }
  }

  #[test]
  fn one_dollar_donation_passes_validation() {
    assert!(payload(100).validate().is_ok());
  }

  #[test]
  fn update_payload_distinguishes_null_from_absent() {
    let absent: UpdateDonationPayload = serde_json::from_str(r#"{"donor_name": "A"}"#).unwrap();
    assert!(absent.message.is_none());

    let cleared: UpdateDonationPayload = serde_json::from_str(r#"{"message": null}"#).unwrap();
    assert_eq!(cleared.message, Some(None));

    let set: UpdateDonationPayload = serde_json::from_str(r#"{"message": "with love"}"#).unwrap();
    assert_eq!(set.message, Some(Some("with love".to_string())));
  }
}
