//! Row models, one struct per table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::PricingSettings;
use crate::error::Result;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Decimal,
    pub price_weight_amount: Decimal,
    pub price_weight_unit: String,
    pub stock: Decimal,
    pub supplier_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cnpj: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Kit {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub discount_pct: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct KitItem {
    pub id: Uuid,
    pub kit_id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub status: String,
    pub payment_method: String,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub discount: Decimal,
    /// Already includes the delivery fee.
    pub total: Decimal,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub name: String,
    pub unit_price: Decimal,
    pub price_weight_amount: Decimal,
    pub price_weight_unit: String,
    pub quantity: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Promotion {
    pub id: Uuid,
    pub name: String,
    pub product_id: Option<Uuid>,
    pub discount_pct: Decimal,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItemRow {
    pub id: Uuid,
    pub session_id: String,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoreSettings {
    pub id: i32,
    pub delivery_fee: Decimal,
    pub free_delivery_threshold: Decimal,
    pub pix_discount_pct: Decimal,
    pub min_cart_weight_kg: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl StoreSettings {
    /// The singleton row seeded by the initial migration.
    pub async fn load(db: &PgPool) -> Result<Self> {
        let settings =
            sqlx::query_as::<_, StoreSettings>("SELECT * FROM store_settings WHERE id = 1")
                .fetch_one(db)
                .await?;
        Ok(settings)
    }

    pub fn pricing(&self) -> PricingSettings {
        PricingSettings {
            delivery_fee: self.delivery_fee,
            free_delivery_threshold: self.free_delivery_threshold,
            pix_discount_pct: self.pix_discount_pct,
        }
    }
}
