//! Sales analytics over a trailing-day window, with period-over-period growth
//! against the window immediately before it, and a CSV export of the same
//! aggregates (semicolon-delimited, comma as decimal separator — the format
//! the back-office spreadsheet flow expects).

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domain::pricing::{growth, round_money};
use crate::domain::OrderStatus;
use crate::error::Result;
use crate::state::AppState;

const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct Metric {
    pub value: Decimal,
    pub growth: Decimal,
}

impl Metric {
    fn new(current: Decimal, previous: Decimal) -> Self {
        Self {
            value: current,
            growth: growth(current, previous),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub period_days: i64,
    pub revenue: Metric,
    pub orders: Metric,
    pub average_ticket: Metric,
    pub new_customers: Metric,
}

async fn revenue_between(db: &PgPool, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Decimal> {
    let row: (Decimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(total), 0) FROM orders \
         WHERE status <> $1 AND created_at >= $2 AND created_at < $3",
    )
    .bind(OrderStatus::Cancelado.as_str())
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(row.0)
}

async fn orders_between(db: &PgPool, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<i64> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM orders \
         WHERE status <> $1 AND created_at >= $2 AND created_at < $3",
    )
    .bind(OrderStatus::Cancelado.as_str())
    .bind(from)
    .bind(to)
    .fetch_one(db)
    .await?;
    Ok(row.0)
}

async fn customers_between(db: &PgPool, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<i64> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM customers WHERE created_at >= $1 AND created_at < $2")
            .bind(from)
            .bind(to)
            .fetch_one(db)
            .await?;
    Ok(row.0)
}

fn average_ticket(revenue: Decimal, orders: i64) -> Decimal {
    if orders == 0 {
        Decimal::ZERO
    } else {
        round_money(revenue / Decimal::from(orders))
    }
}

pub async fn build_summary(db: &PgPool, days: i64) -> Result<AnalyticsSummary> {
    let days = days.clamp(1, 365);
    let now = Utc::now();
    let current_start = now - Duration::days(days);
    let previous_start = now - Duration::days(2 * days);

    // Independent reads, issued in parallel.
    let (rev_cur, rev_prev, ord_cur, ord_prev, cust_cur, cust_prev) = tokio::try_join!(
        revenue_between(db, current_start, now),
        revenue_between(db, previous_start, current_start),
        orders_between(db, current_start, now),
        orders_between(db, previous_start, current_start),
        customers_between(db, current_start, now),
        customers_between(db, previous_start, current_start),
    )?;

    Ok(AnalyticsSummary {
        period_days: days,
        revenue: Metric::new(rev_cur, rev_prev),
        orders: Metric::new(Decimal::from(ord_cur), Decimal::from(ord_prev)),
        average_ticket: Metric::new(
            average_ticket(rev_cur, ord_cur),
            average_ticket(rev_prev, ord_prev),
        ),
        new_customers: Metric::new(Decimal::from(cust_cur), Decimal::from(cust_prev)),
    })
}

pub async fn summary(
    State(s): State<AppState>,
    Query(p): Query<AnalyticsParams>,
) -> Result<Json<AnalyticsSummary>> {
    let summary = build_summary(&s.db, p.days.unwrap_or(DEFAULT_WINDOW_DAYS)).await?;
    Ok(Json(summary))
}

pub async fn export_csv(
    State(s): State<AppState>,
    Query(p): Query<AnalyticsParams>,
) -> Result<impl IntoResponse> {
    let summary = build_summary(&s.db, p.days.unwrap_or(DEFAULT_WINDOW_DAYS)).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"relatorio-vendas.csv\"",
            ),
        ],
        to_csv(&summary),
    ))
}

/// Brazilian number rendering: comma as the decimal separator.
fn br_decimal(value: Decimal, decimals: u32) -> String {
    format!("{:.1$}", value, decimals as usize).replace('.', ",")
}

fn br_growth(value: Decimal) -> String {
    format!("{}%", br_decimal(value, 1))
}

fn to_csv(summary: &AnalyticsSummary) -> String {
    let mut out = String::from("Métrica;Valor;Crescimento\n");
    out.push_str(&format!(
        "Receita;{};{}\n",
        br_decimal(summary.revenue.value, 2),
        br_growth(summary.revenue.growth)
    ));
    out.push_str(&format!(
        "Pedidos;{};{}\n",
        br_decimal(summary.orders.value, 0),
        br_growth(summary.orders.growth)
    ));
    out.push_str(&format!(
        "Ticket Médio;{};{}\n",
        br_decimal(summary.average_ticket.value, 2),
        br_growth(summary.average_ticket.growth)
    ));
    out.push_str(&format!(
        "Novos Clientes;{};{}\n",
        br_decimal(summary.new_customers.value, 0),
        br_growth(summary.new_customers.growth)
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn average_ticket_of_empty_period_is_zero() {
        assert_eq!(average_ticket(Decimal::ZERO, 0), Decimal::ZERO);
        assert_eq!(average_ticket(dec!(100.00), 3), dec!(33.33));
    }

    #[test]
    fn csv_uses_semicolons_and_commas() {
        let summary = AnalyticsSummary {
            period_days: 30,
            revenue: Metric {
                value: dec!(1234.56),
                growth: dec!(50.0),
            },
            orders: Metric {
                value: dec!(42),
                growth: dec!(-10.0),
            },
            average_ticket: Metric {
                value: dec!(29.39),
                growth: dec!(5.5),
            },
            new_customers: Metric {
                value: dec!(7),
                growth: dec!(100),
            },
        };
        let csv = to_csv(&summary);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Métrica;Valor;Crescimento");
        assert_eq!(lines[1], "Receita;1234,56;50,0%");
        assert_eq!(lines[2], "Pedidos;42;-10,0%");
        assert_eq!(lines[3], "Ticket Médio;29,39;5,5%");
        assert_eq!(lines[4], "Novos Clientes;7;100,0%");
    }
}
