//! Request and response bodies for the prediction API.

use serde::{Deserialize, Serialize};

/// Listing features accepted by `POST /predict`.
///
/// All fields are required; the vector handed to the estimator is assembled
/// in the model schema's order, not in JSON field order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseFeatures {
    /// Living area in square meters.
    pub area: f64,
    /// Room count.
    pub rooms: u32,
    /// Building age in years.
    pub age: u32,
    /// Floor number.
    pub floor: u32,
    /// Parking flag (0 or 1).
    pub has_parking: u8,
    /// Location score, 1-10.
    pub location_score: f64,
    /// School district flag (0 or 1).
    pub is_school_district: u8,
    /// Distance to the nearest metro station in meters.
    pub metro_distance: f64,
}

impl HouseFeatures {
    /// Look up a field value by schema name.
    pub fn value_of(&self, name: &str) -> Option<f32> {
        let value = match name {
            "area" => self.area as f32,
            "rooms" => self.rooms as f32,
            "age" => self.age as f32,
            "floor" => self.floor as f32,
            "has_parking" => self.has_parking as f32,
            "location_score" => self.location_score as f32,
            "is_school_district" => self.is_school_district as f32,
            "metro_distance" => self.metro_distance as f32,
            _ => return None,
        };
        Some(value)
    }
}

/// `GET /` body.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
}

/// `GET /health` body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
}

/// Successful `POST /predict` body.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub status: &'static str,
    pub predicted_price: f64,
    /// Standard deviation of ensemble member predictions, when the
    /// estimator supports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_spread: Option<f64>,
    pub input_features: HouseFeatures,
    pub model_type: String,
}

/// Failed `POST /predict` body.
#[derive(Debug, Serialize)]
pub struct PredictFailure {
    pub error: String,
    /// Always `null`; kept so failures are shaped like successes.
    pub predicted_price: Option<f64>,
}
