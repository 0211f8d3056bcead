use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use holdscope::api::{self, analyze::ANALYSIS_ID_HEADER, AppState};
use holdscope::config::{Config, FlipPolicy};
use serde_json::{json, Value};
use tower::util::ServiceExt;

const LEDGER_CSV: &str = "\
Ticker,Position,Quantity,TradedPrice,TradedTime,Strike,Expiry
TCS,1,10,100,2024-03-01 10:00:00,,
TCS,-1,10,110,2024-03-08 10:00:00,,
";

fn test_app(config: Config) -> axum::Router {
    api::create_router(AppState::new(config))
}

async fn post(
    app: axum::Router,
    uri: &str,
    content_type: &str,
    body: impl Into<Body>,
) -> (StatusCode, Option<String>, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(body.into())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let analysis_id = res
        .headers()
        .get(ANALYSIS_ID_HEADER)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, analysis_id, body)
}

#[tokio::test]
async fn test_analyze_csv_upload() {
    let (status, analysis_id, body) = post(
        test_app(Config::default()),
        "/v1/analyze?capital=1000",
        "text/csv",
        LEDGER_CSV,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let analysis_id = analysis_id.expect("analysis id header");
    assert!(uuid::Uuid::parse_str(&analysis_id).is_ok());

    assert_eq!(body["tradeCount"], 2);
    assert_eq!(body["totalPnl"], json!(100.0));
    assert_eq!(body["overallReturnPct"], json!(10.0));
    assert_eq!(body["durationDays"], 7);
    assert_eq!(body["startDate"], "2024-03-01");
    assert_eq!(body["cashHoldings"].as_array().unwrap().len(), 1);
    assert_eq!(body["cashHoldings"][0]["instrument"]["class"], "cash_underlying");
}

#[tokio::test]
async fn test_analyze_json_upload() {
    let export = json!({
        "data": {
            "trades": [{
                "Ticker": "NIFTY", "Position": 1, "Quantity": 50, "TradedPrice": 120.5,
                "TradedTime": "2024-03-01T09:15:00", "Strike": 22000,
                "Expiry": "28-Mar-2024", "OptionType": "PE"
            }]
        }
    });

    let (status, _, body) = post(
        test_app(Config::default()),
        "/v1/analyze?capital=50000&format=clktrd",
        "application/octet-stream",
        serde_json::to_vec(&export).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tradeCount"], 1);
    assert_eq!(body["residualLots"].as_array().unwrap().len(), 1);
    assert_eq!(body["residualLots"][0]["instrument"]["class"], "option");
    assert_eq!(body["residualLots"][0]["instrument"]["optionType"], "put");
    assert_eq!(body["optionContractSpans"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_or_invalid_capital_is_bad_request() {
    let (status, analysis_id, body) = post(
        test_app(Config::default()),
        "/v1/analyze",
        "text/csv",
        LEDGER_CSV,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(analysis_id.is_none());
    assert!(body["error"].as_str().unwrap().contains("capital"));

    let (status, _, _) = post(
        test_app(Config::default()),
        "/v1/analyze?capital=lots",
        "text/csv",
        LEDGER_CSV,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = post(
        test_app(Config::default()),
        "/v1/analyze?capital=1000&format=xlsx",
        "text/csv",
        LEDGER_CSV,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analysis_errors_are_unprocessable() {
    let (status, _, body) = post(
        test_app(Config::default()),
        "/v1/analyze?capital=0",
        "text/csv",
        LEDGER_CSV,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "invalid_capital");

    let (status, _, body) = post(
        test_app(Config::default()),
        "/v1/analyze?capital=1000",
        "text/csv",
        "Ticker,Position\nTCS,1\n",
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "unsupported_schema");

    let bad_row = "\
Ticker,Position,Quantity,TradedPrice,TradedTime,Strike,Expiry
TCS,1,10,100,2024-03-01 10:00:00,,
TCS,1,10,100,not a time,,
";
    let (status, _, body) = post(
        test_app(Config::default()),
        "/v1/analyze?capital=1000",
        "text/csv",
        bad_row,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "malformed_row");
    assert_eq!(body["row"], 1);
    assert_eq!(body["column"], "TradedTime");
}

#[tokio::test]
async fn test_tiny_capital_is_unprocessable() {
    let (status, _, body) = post(
        test_app(Config::default()),
        "/v1/analyze?capital=0.0000000000000000000000001",
        "text/csv",
        LEDGER_CSV,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "overflow");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let config = Config {
        max_upload_bytes: 16,
        ..Config::default()
    };
    let (status, _, _) = post(
        test_app(config),
        "/v1/analyze?capital=1000",
        "text/csv",
        LEDGER_CSV,
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_ready_reports_policies() {
    let config = Config {
        flip_policy: FlipPolicy::Discard,
        ..Config::default()
    };
    let req = Request::builder()
        .uri("/ready")
        .body(Body::empty())
        .unwrap();
    let res = test_app(config).oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["flipPolicy"], "discard");
    assert_eq!(body["unrealizedPnl"], "mark");
}
