pub mod holdings;
pub mod ledger;
pub mod plans;
pub mod review;

use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
