use serde_json::{json, Value};

use crate::response::ApiResponse;

pub async fn healthcheck() -> ApiResponse<Value> {
    ApiResponse::ok(json!({ "status": "OK" }), "OK")
}
