//! Prediction API behavior, driven through the full router.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use priceforest::housing::{synthesize, SynthConfig};
use priceforest::model::PriceModel;
use priceforest::serve::{self, ModelState};
use priceforest::training::{ForestParams, ForestTrainer};
use priceforest::utils::Parallelism;

fn trained_router() -> Router {
    let data = synthesize(&SynthConfig {
        n_samples: 300,
        seed: 42,
    });
    let forest = ForestTrainer::new(ForestParams {
        n_trees: 15,
        ..Default::default()
    })
    .train(&data, Parallelism::Sequential)
    .unwrap();
    let model = PriceModel::from_forest(forest, &data);
    serve::router(std::sync::Arc::new(ModelState::Ready(Box::new(model))))
}

fn degraded_router() -> Router {
    serve::router(std::sync::Arc::new(ModelState::Unavailable(
        "artifact not found".into(),
    )))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn sample_request() -> Value {
    json!({
        "area": 85.5,
        "rooms": 3,
        "age": 8,
        "floor": 12,
        "has_parking": 1,
        "location_score": 7.5,
        "is_school_district": 0,
        "metro_distance": 350.0
    })
}

#[tokio::test]
async fn root_reports_liveness() {
    let (status, body) = get_json(trained_router(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
}

#[tokio::test]
async fn health_reflects_loaded_model() {
    let (status, body) = get_json(trained_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
}

#[tokio::test]
async fn health_reflects_degraded_state() {
    let (status, body) = get_json(degraded_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn predict_returns_price_with_echo() {
    let (status, body) = post_json(trained_router(), "/predict", sample_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["model_type"], "random_forest");
    assert_eq!(body["input_features"]["area"], 85.5);

    let price = body["predicted_price"].as_f64().unwrap();
    assert!(price.is_finite());
    // Synthetic prices are clamped to this band at generation time.
    assert!((500_000.0..=5_000_000.0).contains(&price));

    // Bagged forest also reports member spread.
    assert!(body["price_spread"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn predict_never_returns_a_price_when_degraded() {
    let (status, body) = post_json(degraded_router(), "/predict", sample_request()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["predicted_price"], Value::Null);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("model not loaded"));
    assert!(error.contains("artifact not found"));
}

#[tokio::test]
async fn predict_rejects_missing_field() {
    let mut request = sample_request();
    request.as_object_mut().unwrap().remove("area");

    let (status, _) = post_json(trained_router(), "/predict", request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn predict_rejects_out_of_domain_flag() {
    let mut request = sample_request();
    request["has_parking"] = json!(3);

    let (status, body) = post_json(trained_router(), "/predict", request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["predicted_price"], Value::Null);
    assert!(body["error"].as_str().unwrap().contains("has_parking"));
}

#[tokio::test]
async fn predict_is_stateless_across_requests() {
    let app = trained_router();

    let (_, first) = post_json(app.clone(), "/predict", sample_request()).await;
    let (_, again) = post_json(app, "/predict", sample_request()).await;
    assert_eq!(first["predicted_price"], again["predicted_price"]);
}

#[tokio::test]
async fn degraded_service_comes_from_bad_artifact_on_disk() {
    // Full startup path: a corrupt artifact file degrades the service
    // instead of crashing it.
    let path = std::env::temp_dir().join("priceforest_serving_corrupt.pfor");
    std::fs::write(&path, b"not a real artifact at all").unwrap();

    let state = serve::load_state(&path);
    std::fs::remove_file(&path).ok();
    assert!(!state.model_loaded());

    let (status, body) = post_json(serve::router(state), "/predict", sample_request()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["predicted_price"], Value::Null);
}
