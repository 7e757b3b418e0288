//! Kits: bundles of products sold as one catalog entry. A kit's price is
//! never stored; it is recomputed from the current product prices on every
//! read, minus the kit's percentage discount.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::{ListParams, PaginatedResponse};
use crate::domain::pricing::{kit_price, KitLine};
use crate::domain::weight::round_weight;
use crate::error::{AppError, Result};
use crate::models::Kit;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct KitItemView {
    #[serde(skip_serializing)]
    pub kit_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub price_weight_amount: Decimal,
    pub price_weight_unit: String,
    pub quantity: Decimal,
}

#[derive(Debug, Serialize)]
pub struct KitView {
    #[serde(flatten)]
    pub kit: Kit,
    pub items: Vec<KitItemView>,
    /// Derived: sum of constituent line totals minus the kit discount.
    pub price: Decimal,
}

fn assemble(kit: Kit, items: Vec<KitItemView>) -> KitView {
    let lines: Vec<KitLine> = items
        .iter()
        .map(|i| KitLine {
            unit_price: i.unit_price,
            price_weight_amount: i.price_weight_amount,
            quantity: i.quantity,
        })
        .collect();
    let price = kit_price(&lines, kit.discount_pct);
    KitView { kit, items, price }
}

async fn fetch_items(db: &sqlx::PgPool, kit_ids: &[Uuid]) -> Result<Vec<KitItemView>> {
    let items = sqlx::query_as::<_, KitItemView>(
        "SELECT ki.kit_id, ki.product_id, p.name, p.price AS unit_price, \
                p.price_weight_amount, p.price_weight_unit, ki.quantity \
         FROM kit_items ki JOIN products p ON p.id = ki.product_id \
         WHERE ki.kit_id = ANY($1) ORDER BY p.name",
    )
    .bind(kit_ids)
    .fetch_all(db)
    .await?;
    Ok(items)
}

pub async fn list(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<PaginatedResponse<KitView>>> {
    let like = p.like_pattern();
    let kits = sqlx::query_as::<_, Kit>(
        "SELECT * FROM kits WHERE active AND ($1::text IS NULL OR name ILIKE $1) \
         ORDER BY name LIMIT $2 OFFSET $3",
    )
    .bind(&like)
    .bind(p.limit())
    .bind(p.offset())
    .fetch_all(&s.db)
    .await?;
    let total: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM kits WHERE active AND ($1::text IS NULL OR name ILIKE $1)")
            .bind(&like)
            .fetch_one(&s.db)
            .await?;

    let ids: Vec<Uuid> = kits.iter().map(|k| k.id).collect();
    let mut by_kit: HashMap<Uuid, Vec<KitItemView>> = HashMap::new();
    for item in fetch_items(&s.db, &ids).await? {
        by_kit.entry(item.kit_id).or_default().push(item);
    }
    let data = kits
        .into_iter()
        .map(|k| {
            let items = by_kit.remove(&k.id).unwrap_or_default();
            assemble(k, items)
        })
        .collect();
    Ok(Json(PaginatedResponse {
        data,
        total: total.0,
        page: p.page(),
    }))
}

pub async fn get(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<KitView>> {
    let kit = sqlx::query_as::<_, Kit>("SELECT * FROM kits WHERE id = $1 AND active")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .ok_or(AppError::NotFound("kit"))?;
    let items = fetch_items(&s.db, &[kit.id]).await?;
    Ok(Json(assemble(kit, items)))
}

#[derive(Debug, Deserialize)]
pub struct KitItemPayload {
    pub product_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct KitPayload {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub description: Option<String>,
    pub discount_pct: Decimal,
    pub items: Vec<KitItemPayload>,
}

impl KitPayload {
    fn check(&self) -> Result<()> {
        self.validate()?;
        if self.discount_pct < Decimal::ZERO || self.discount_pct > Decimal::ONE_HUNDRED {
            return Err(AppError::Invalid("desconto deve estar entre 0 e 100".into()));
        }
        if self.items.is_empty() {
            return Err(AppError::Invalid("kit precisa de pelo menos um produto".into()));
        }
        if self.items.iter().any(|i| i.quantity <= Decimal::ZERO) {
            return Err(AppError::Invalid("quantidade deve ser positiva".into()));
        }
        Ok(())
    }
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    kit_id: Uuid,
    items: &[KitItemPayload],
) -> Result<()> {
    for item in items {
        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM products WHERE id = $1 AND active")
                .bind(item.product_id)
                .fetch_optional(&mut **tx)
                .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("produto"));
        }
        sqlx::query(
            "INSERT INTO kit_items (id, kit_id, product_id, quantity) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::now_v7())
        .bind(kit_id)
        .bind(item.product_id)
        .bind(round_weight(item.quantity))
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn create(
    State(s): State<AppState>,
    Json(r): Json<KitPayload>,
) -> Result<(StatusCode, Json<KitView>)> {
    r.check()?;
    let mut tx = s.db.begin().await?;
    let kit = sqlx::query_as::<_, Kit>(
        "INSERT INTO kits (id, name, description, discount_pct, active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, TRUE, NOW(), NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.name)
    .bind(&r.description)
    .bind(r.discount_pct)
    .fetch_one(&mut *tx)
    .await?;
    insert_items(&mut tx, kit.id, &r.items).await?;
    tx.commit().await?;

    let items = fetch_items(&s.db, &[kit.id]).await?;
    Ok((StatusCode::CREATED, Json(assemble(kit, items))))
}

/// Items are replaced wholesale on update.
pub async fn update(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<KitPayload>,
) -> Result<Json<KitView>> {
    r.check()?;
    let mut tx = s.db.begin().await?;
    let kit = sqlx::query_as::<_, Kit>(
        "UPDATE kits SET name = $2, description = $3, discount_pct = $4, updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&r.name)
    .bind(&r.description)
    .bind(r.discount_pct)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("kit"))?;
    sqlx::query("DELETE FROM kit_items WHERE kit_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_items(&mut tx, kit.id, &r.items).await?;
    tx.commit().await?;

    let items = fetch_items(&s.db, &[kit.id]).await?;
    Ok(Json(assemble(kit, items)))
}

pub async fn deactivate(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let result = sqlx::query("UPDATE kits SET active = FALSE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("kit"));
    }
    Ok(StatusCode::NO_CONTENT)
}
