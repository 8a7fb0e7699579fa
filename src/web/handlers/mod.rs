// Declare handler modules
pub mod auth_handlers;
pub mod cart_handlers;
pub mod category_handlers;
pub mod donation_handlers;
pub mod order_handlers;
pub mod product_handlers;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field from an explicit `null` in PATCH-style
/// payloads: absent → `None` (keep), `null` → `Some(None)` (clear),
/// value → `Some(Some(v))` (set). Pair with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Deserialize::deserialize(deserializer).map(Some)
}
