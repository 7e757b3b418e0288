//! Admin order management: list with status filter and search, detail with
//! items, and status updates validated against the status machine.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ListParams, PaginatedResponse};
use crate::domain::OrderStatus;
use crate::error::{AppError, Result};
use crate::models::{Order, OrderItem};
use crate::state::AppState;

pub async fn list(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Order>>> {
    // Reject unknown status values instead of silently matching nothing.
    let status = p
        .status
        .as_deref()
        .map(|v| v.parse::<OrderStatus>())
        .transpose()?
        .map(|v| v.as_str());
    let like = p.like_pattern();
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders \
         WHERE ($1::text IS NULL OR status = $1) \
           AND ($2::text IS NULL OR order_number ILIKE $2 OR customer_name ILIKE $2) \
         ORDER BY created_at DESC LIMIT $3 OFFSET $4",
    )
    .bind(status)
    .bind(&like)
    .bind(p.limit())
    .bind(p.offset())
    .fetch_all(&s.db)
    .await?;
    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM orders \
         WHERE ($1::text IS NULL OR status = $1) \
           AND ($2::text IS NULL OR order_number ILIKE $2 OR customer_name ILIKE $2)",
    )
    .bind(status)
    .bind(&like)
    .fetch_one(&s.db)
    .await?;
    Ok(Json(PaginatedResponse {
        data: orders,
        total: total.0,
        page: p.page(),
    }))
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

pub async fn get(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<OrderDetail>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .ok_or(AppError::NotFound("pedido"))?;
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = $1 ORDER BY name",
    )
    .bind(id)
    .fetch_all(&s.db)
    .await?;
    Ok(Json(OrderDetail { order, items }))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

pub async fn update_status(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<StatusUpdate>,
) -> Result<Json<Order>> {
    let mut tx = s.db.begin().await?;
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("pedido"))?;

    let current: OrderStatus = order.status.parse()?;
    let next = current.transition_to(r.status)?;

    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(next.as_str())
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!(order_number = %order.order_number, status = %order.status, "order status updated");
    Ok(Json(order))
}
