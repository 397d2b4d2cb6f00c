//! HTTP prediction service.
//!
//! The service is a two-state machine fixed at startup: the artifact either
//! loaded (`Ready`) or it did not (`Unavailable`). A failed load never
//! crashes the process; every prediction in the degraded state returns an
//! explicit model-unavailable error while `/health` reports the state
//! truthfully.

mod dto;

pub use dto::{HealthResponse, HouseFeatures, PredictFailure, PredictResponse, RootResponse};

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::housing;
use crate::model::{PredictError, PriceModel};

// =============================================================================
// Model State
// =============================================================================

/// Serving state, decided once at startup.
#[derive(Debug)]
pub enum ModelState {
    /// Artifact loaded; requests are served from this model.
    Ready(Box<PriceModel>),
    /// Artifact failed to load; the reason is echoed to every caller.
    Unavailable(String),
}

impl ModelState {
    /// Whether a model is loaded.
    pub fn model_loaded(&self) -> bool {
        matches!(self, ModelState::Ready(_))
    }
}

/// Shared read-only serving state.
pub type SharedState = Arc<ModelState>;

/// Load the artifact at `path`, validated against the housing schema.
///
/// On failure the service comes up degraded instead of exiting.
pub fn load_state(path: impl AsRef<Path>) -> SharedState {
    let path = path.as_ref();
    match PriceModel::load_validated(path, &housing::schema()) {
        Ok(model) => {
            log::info!(
                "loaded {} model from {} ({} features)",
                model.model_type(),
                path.display(),
                model.n_features()
            );
            Arc::new(ModelState::Ready(Box::new(model)))
        }
        Err(err) => {
            log::error!("failed to load model from {}: {err}", path.display());
            Arc::new(ModelState::Unavailable(err.to_string()))
        }
    }
}

// =============================================================================
// Router
// =============================================================================

/// Build the service router.
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "house price prediction service",
        status: "active",
    })
}

async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let loaded = state.model_loaded();
    Json(HealthResponse {
        status: if loaded { "healthy" } else { "unhealthy" },
        model_loaded: loaded,
    })
}

async fn predict(
    State(state): State<SharedState>,
    Json(features): Json<HouseFeatures>,
) -> Result<Json<PredictResponse>, PredictRejection> {
    let model = match state.as_ref() {
        ModelState::Ready(model) => model,
        ModelState::Unavailable(reason) => {
            return Err(PredictRejection::Unavailable(format!(
                "model not loaded: {reason}"
            )));
        }
    };

    let vector = feature_vector(&features, model)?;
    model
        .schema()
        .validate_row(&vector)
        .map_err(|e| PredictRejection::Validation(e.to_string()))?;

    let (price, spread) = model.predict_with_spread(&vector).map_err(|e| match e {
        PredictError::WrongLength { .. } => PredictRejection::Validation(e.to_string()),
        PredictError::NonFinite { .. } => {
            PredictRejection::Inference(format!("prediction failed: {e}"))
        }
    })?;

    Ok(Json(PredictResponse {
        status: "success",
        predicted_price: round2(price as f64),
        price_spread: spread.map(|s| round2(s as f64)),
        input_features: features,
        model_type: model.model_type().to_string(),
    }))
}

/// Assemble the feature vector in the model schema's order.
fn feature_vector(
    features: &HouseFeatures,
    model: &PriceModel,
) -> Result<Vec<f32>, PredictRejection> {
    model
        .schema()
        .names()
        .map(|name| {
            features.value_of(name).ok_or_else(|| {
                PredictRejection::Validation(format!("request is missing field '{name}'"))
            })
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Rejections
// =============================================================================

/// Prediction failure classes, mapped to HTTP statuses.
#[derive(Debug)]
pub enum PredictRejection {
    /// Request payload failed schema validation (422).
    Validation(String),
    /// No model is loaded (503).
    Unavailable(String),
    /// The estimator failed on this input (500).
    Inference(String),
}

impl IntoResponse for PredictRejection {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            PredictRejection::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            PredictRejection::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            PredictRejection::Inference(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (
            status,
            Json(PredictFailure {
                error,
                predicted_price: None,
            }),
        )
            .into_response()
    }
}
