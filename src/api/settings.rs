//! Store settings: the single source of truth for the delivery fee, the
//! free-delivery threshold, the PIX discount percentage and the minimum cart
//! weight. These used to be scattered constants; now every computation reads
//! the same row.

use axum::extract::State;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::StoreSettings;
use crate::state::AppState;

pub async fn get(State(s): State<AppState>) -> Result<Json<StoreSettings>> {
    Ok(Json(StoreSettings::load(&s.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct SettingsPayload {
    pub delivery_fee: Decimal,
    pub free_delivery_threshold: Decimal,
    pub pix_discount_pct: Decimal,
    pub min_cart_weight_kg: Decimal,
}

impl SettingsPayload {
    fn check(&self) -> Result<()> {
        if self.delivery_fee < Decimal::ZERO {
            return Err(AppError::Invalid("taxa de entrega nao pode ser negativa".into()));
        }
        if self.free_delivery_threshold < Decimal::ZERO {
            return Err(AppError::Invalid(
                "limite de frete gratis nao pode ser negativo".into(),
            ));
        }
        if self.pix_discount_pct < Decimal::ZERO || self.pix_discount_pct > Decimal::ONE_HUNDRED {
            return Err(AppError::Invalid(
                "desconto PIX deve estar entre 0 e 100".into(),
            ));
        }
        if self.min_cart_weight_kg <= Decimal::ZERO {
            return Err(AppError::Invalid("peso minimo deve ser positivo".into()));
        }
        Ok(())
    }
}

pub async fn update(
    State(s): State<AppState>,
    Json(r): Json<SettingsPayload>,
) -> Result<Json<StoreSettings>> {
    r.check()?;
    let settings = sqlx::query_as::<_, StoreSettings>(
        "UPDATE store_settings SET delivery_fee = $1, free_delivery_threshold = $2, \
         pix_discount_pct = $3, min_cart_weight_kg = $4, updated_at = NOW() \
         WHERE id = 1 RETURNING *",
    )
    .bind(r.delivery_fee)
    .bind(r.free_delivery_threshold)
    .bind(r.pix_discount_pct)
    .bind(r.min_cart_weight_kg)
    .fetch_one(&s.db)
    .await?;
    tracing::info!(
        delivery_fee = %settings.delivery_fee,
        threshold = %settings.free_delivery_threshold,
        "store settings updated"
    );
    Ok(Json(settings))
}
