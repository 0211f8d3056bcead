use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::Decimal;

/// Failures that halt an analysis run. None are retried: the input is static.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// A row is missing a required value or carries an unparseable one.
    #[error("malformed row {row}: {column}: {reason}")]
    MalformedRow {
        row: usize,
        column: String,
        reason: String,
    },
    /// The document is not a supported export (missing columns, wrong shape).
    #[error("unsupported export schema: {reason}")]
    UnsupportedSchema { reason: String },
    #[error("capital must be positive, got {0}")]
    InvalidCapital(Decimal),
    /// A derived figure does not fit the decimal range.
    #[error("{what} is out of range")]
    Overflow { what: String },
}

impl AnalysisError {
    pub fn malformed(row: usize, column: &str, reason: impl Into<String>) -> Self {
        AnalysisError::MalformedRow {
            row,
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(reason: impl Into<String>) -> Self {
        AnalysisError::UnsupportedSchema {
            reason: reason.into(),
        }
    }

    pub fn missing_columns(missing: &[&str]) -> Self {
        Self::unsupported(format!("missing required columns: {}", missing.join(", ")))
    }

    pub fn overflow(what: impl Into<String>) -> Self {
        AnalysisError::Overflow { what: what.into() }
    }

    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::MalformedRow { .. } => "malformed_row",
            AnalysisError::UnsupportedSchema { .. } => "unsupported_schema",
            AnalysisError::InvalidCapital(_) => "invalid_capital",
            AnalysisError::Overflow { .. } => "overflow",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Analysis(err) => {
                let mut body = json!({
                    "error": err.to_string(),
                    "kind": err.kind(),
                });
                if let AnalysisError::MalformedRow { row, column, .. } = &err {
                    body["row"] = json!(row);
                    body["column"] = json!(column);
                }
                (StatusCode::UNPROCESSABLE_ENTITY, body)
            }
        };

        (status, Json(body)).into_response()
    }
}
