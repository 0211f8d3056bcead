use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::domain::Decimal;
use crate::error::AppError;
use crate::ingest::ExportFormat;

pub const ANALYSIS_ID_HEADER: &str = "x-analysis-id";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeQuery {
    pub capital: Option<String>,
    pub format: Option<String>,
}

/// `POST /v1/analyze?capital=..&format=..` with the raw export as the body.
pub async fn analyze(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let capital = params
        .capital
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("capital is required".to_string()))
        .and_then(|s| {
            Decimal::from_str_canonical(s)
                .map_err(|_| AppError::BadRequest("Invalid capital".to_string()))
        })?;

    let format = resolve_format(params.format.as_deref(), &headers)?;

    let analysis_id = Uuid::new_v4();
    let span = tracing::info_span!("analysis", %analysis_id, ?format, bytes = body.len());
    let result = span.in_scope(|| state.analyzer.analyze(&body, format, capital));

    let result = result.inspect_err(|e| {
        tracing::warn!(%analysis_id, kind = e.kind(), error = %e, "analysis rejected");
    })?;

    Ok(([(ANALYSIS_ID_HEADER, analysis_id.to_string())], Json(result)))
}

/// Explicit `format` wins; otherwise `text/csv` bodies are CSV and everything else JSON.
fn resolve_format(param: Option<&str>, headers: &HeaderMap) -> Result<ExportFormat, AppError> {
    if let Some(raw) = param.map(str::trim).filter(|s| !s.is_empty()) {
        return raw
            .parse()
            .map_err(|e| AppError::BadRequest(format!("Invalid format: {}", e)));
    }

    let is_csv = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().contains("csv"))
        .unwrap_or(false);

    Ok(if is_csv {
        ExportFormat::Csv
    } else {
        ExportFormat::Json
    })
}
