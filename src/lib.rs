//! Açougue — meat-shop storefront and back-office service
//!
//! ## Features
//! - Weight-based catalog: products priced per reference amount (kg/g), sold
//!   in fractional quantities
//! - Kits (bundles) with derived pricing
//! - Session cart and checkout with delivery-fee tiering and PIX discount
//! - Order management with a closed fulfillment status machine
//! - Suppliers, promotions and store settings
//! - Sales analytics with period-over-period growth and CSV export

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod models;
pub mod state;

pub use error::{AppError, Result};
