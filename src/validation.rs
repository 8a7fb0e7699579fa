//! Field-level request validation.
//!
//! Each request payload declares its constraints explicitly in a `validate`
//! method built from these checks; failures accumulate into a [`FieldErrors`]
//! map and surface as the 422 envelope.

use crate::errors::FieldErrors;

pub fn required(errors: &mut FieldErrors, field: &str, value: &str) {
  if value.trim().is_empty() {
    errors.push(field, "is required");
  }
}

pub fn max_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
  if value.chars().count() > max {
    errors.push(field, format!("must not exceed {max} characters"));
  }
}

/// Minimal shape check, not RFC-grade parsing.
pub fn email(errors: &mut FieldErrors, field: &str, value: &str) {
  let valid = match value.split_once('@') {
    Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
    None => false,
  };
  if !valid {
    errors.push(field, "must be a valid email address");
  }
}

pub fn min_i64(errors: &mut FieldErrors, field: &str, value: i64, min: i64) {
  if value < min {
    errors.push(field, format!("must be at least {min}"));
  }
}

pub fn min_i32(errors: &mut FieldErrors, field: &str, value: i32, min: i32) {
  if value < min {
    errors.push(field, format!("must be at least {min}"));
  }
}

pub fn min_len(errors: &mut FieldErrors, field: &str, value: &str, min: usize) {
  if value.chars().count() < min {
    errors.push(field, format!("must be at least {min} characters"));
  }
}

pub fn one_of(errors: &mut FieldErrors, field: &str, value: &str, allowed: &[&str]) {
  if !allowed.contains(&value) {
    errors.push(field, format!("must be one of: {}", allowed.join(", ")));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn required_rejects_blank_values() {
    let mut errors = FieldErrors::new();
    required(&mut errors, "name", "  ");
    required(&mut errors, "slug", "quilts");
    assert!(errors.contains("name"));
    assert!(!errors.contains("slug"));
  }

  #[test]
  fn email_shape_checks() {
    let mut errors = FieldErrors::new();
    email(&mut errors, "donor_email", "asha@example.com");
    assert!(errors.is_empty());

    for bad in ["not-an-email", "@example.com", "a@.com", "a@nodot"] {
      let mut errors = FieldErrors::new();
      email(&mut errors, "donor_email", bad);
      assert!(errors.contains("donor_email"), "{bad} should be rejected");
    }
  }

  #[test]
  fn donation_amount_rule() {
    // amount_cents <= 0 rejected, 100 cents (1.00) accepted
    let mut errors = FieldErrors::new();
    min_i64(&mut errors, "amount_cents", 0, 1);
    assert!(errors.contains("amount_cents"));

    let mut errors = FieldErrors::new();
    min_i64(&mut errors, "amount_cents", 100, 1);
    assert!(errors.is_empty());
  }

  #[test]
  fn one_of_rejects_unknown_status() {
    let allowed = ["pending", "processing", "completed", "shipped", "cancelled"];
    let mut errors = FieldErrors::new();
    one_of(&mut errors, "status", "refunded", &allowed);
    assert!(errors.contains("status"));
  }
}
