//! Craftroots: storefront and donation API for a nonprofit handmade-goods shop.

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod validation;
pub mod web;
