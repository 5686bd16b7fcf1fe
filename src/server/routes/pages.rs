//! Daily expense page

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use chrono::Local;

use crate::persistence::{CategoryTotal, Transaction};
use crate::server::state::AppState;
use crate::server::types::{DateQuery, ErrorResponse};

/// GET / - transactions for one day, with totals and the ingest form
pub async fn home(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Html<String>, (StatusCode, Json<ErrorResponse>)> {
    let day = query
        .date
        .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());

    let rows = state.store.list_for_day(&day).await.map_err(internal)?;
    let total = state.store.total_for_day(&day).await.map_err(internal)?;
    let categories = state
        .store
        .category_totals_for_day(&day)
        .await
        .map_err(internal)?;

    Ok(Html(render_home(&day, &rows, total, &categories)))
}

fn internal(e: anyhow::Error) -> (StatusCode, Json<ErrorResponse>) {
    tracing::error!(error = %e, "home page query failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

fn render_home(day: &str, rows: &[Transaction], total: i64, categories: &[CategoryTotal]) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        "<h1>지출 내역 — {}</h1>\n<p class=\"total\">합계: {}원</p>\n",
        escape(day),
        total
    ));

    body.push_str(
        "<form method=\"post\" action=\"/ingest\">\n\
         <input type=\"text\" name=\"raw_text\" placeholder=\"카드 문자 붙여넣기\" size=\"60\">\n\
         <button type=\"submit\">추가</button>\n</form>\n",
    );

    body.push_str("<h2>카테고리</h2>\n<ul>\n");
    for cat in categories {
        let name = if cat.category.is_empty() {
            "(미분류)"
        } else {
            &cat.category
        };
        body.push_str(&format!(
            "<li>{}: {}원 ({}건)</li>\n",
            escape(name),
            cat.total,
            cat.count
        ));
    }
    body.push_str("</ul>\n");

    body.push_str(
        "<h2>거래</h2>\n<table>\n<tr><th>시각</th><th>가맹점</th><th>금액</th>\
         <th>카드</th><th>구분</th><th>카테고리</th></tr>\n",
    );
    for tx in rows {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&tx.tx_datetime),
            escape(&tx.merchant),
            tx.amount,
            escape(&tx.card_or_account),
            escape(&tx.tx_type),
            escape(&tx.category),
        ));
    }
    body.push_str("</table>\n");

    format!(
        "<!doctype html>\n<html lang=\"ko\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Expense Tracker</title>\n\
         <link rel=\"stylesheet\" href=\"/static/style.css\">\n</head>\n\
         <body>\n{}</body>\n</html>\n",
        body
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_escapes_merchant() {
        let tx = Transaction {
            id: "id".to_string(),
            tx_datetime: "2024-10-07 13:45:00".to_string(),
            yyyy_mm_dd: "2024-10-07".to_string(),
            merchant: "<script>x</script>".to_string(),
            amount: 1000,
            currency: "KRW".to_string(),
            card_or_account: "현대카드".to_string(),
            method: "일시불".to_string(),
            tx_type: "승인".to_string(),
            category: String::new(),
            raw_text: String::new(),
            created_at: String::new(),
        };

        let html = render_home("2024-10-07", &[tx], 1000, &[]);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>x"));
        assert!(html.contains("합계: 1000원"));
    }
}
