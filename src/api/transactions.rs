use crate::api::AppState;
use crate::domain::{Symbol, TimeMs, Transaction};
use crate::error::AppError;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    pub symbol: Option<String>,
    pub from_ms: Option<i64>,
    pub to_ms: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

fn parse_query(
    params: &TransactionsQuery,
) -> Result<(Option<Symbol>, Option<TimeMs>, Option<TimeMs>), AppError> {
    let symbol = params.symbol.as_deref().map(Symbol::new);
    let from_ms = params.from_ms.map(TimeMs::new);
    let to_ms = params.to_ms.map(TimeMs::new);
    if let (Some(from_ms), Some(to_ms)) = (from_ms, to_ms) {
        if from_ms > to_ms {
            return Err(AppError::BadRequest("fromMs must be <= toMs".into()));
        }
    }
    Ok((symbol, from_ms, to_ms))
}

pub async fn get_transactions(
    Query(params): Query<TransactionsQuery>,
    State(state): State<AppState>,
) -> Result<Json<TransactionsResponse>, AppError> {
    let (symbol, from_ms, to_ms) = parse_query(&params)?;

    let transactions = state
        .repo
        .query_transactions(symbol.as_ref(), from_ms, to_ms)
        .await?;

    Ok(Json(TransactionsResponse { transactions }))
}

/// CSV rendering of the same history query.
pub async fn export_transactions(
    Query(params): Query<TransactionsQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let (symbol, from_ms, to_ms) = parse_query(&params)?;

    let transactions = state
        .repo
        .query_transactions(symbol.as_ref(), from_ms, to_ms)
        .await?;

    let csv = transactions_to_csv(&transactions)
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv,
    ))
}

fn transactions_to_csv(transactions: &[Transaction]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "timeMs",
        "symbol",
        "side",
        "quantity",
        "price",
        "commissionAmount",
        "netAmount",
    ])?;

    for tx in transactions {
        writer.write_record([
            tx.id.to_string(),
            tx.time_ms.as_i64().to_string(),
            tx.symbol.as_str().to_string(),
            tx.side.to_string(),
            tx.quantity.to_string(),
            tx.price.to_canonical_string(),
            tx.commission_amount.to_canonical_string(),
            tx.net_amount.to_canonical_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Decimal;

    #[test]
    fn test_csv_has_header_plus_row_per_transaction() {
        let txs = vec![
            Transaction::buy(Symbol::new("AAPL"), 10, Decimal::from_i64(100)),
            Transaction::sell(
                Symbol::new("AAPL"),
                10,
                Decimal::from_i64(150),
                Decimal::from_i64(5),
                Decimal::from_str_canonical("1366.3").unwrap(),
            ),
        ];

        let csv = transactions_to_csv(&txs).unwrap();
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,timeMs,symbol,side"));
        assert!(lines[1].contains(",buy,"));
        assert!(lines[2].contains(",sell,"));
        assert!(lines[2].contains("1366.3"));
    }

    #[test]
    fn test_empty_history_exports_header_only() {
        let csv = transactions_to_csv(&[]).unwrap();
        assert_eq!(csv.trim_end().lines().count(), 1);
    }

    #[test]
    fn test_query_rejects_inverted_window() {
        let params = TransactionsQuery {
            symbol: None,
            from_ms: Some(2000),
            to_ms: Some(1000),
        };
        assert!(parse_query(&params).is_err());
    }
}
