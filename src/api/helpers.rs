//! Response builders for the callable envelope.

use serde_json::{Value, json};

use crate::core::models::UserResult;
use crate::errors::AdminError;

fn respond(status_code: u16, body: &Value) -> Value {
    json!({
        "statusCode": status_code,
        "headers": { "content-type": "application/json" },
        "body": body.to_string()
    })
}

/// Returns a 200 response wrapping `result` as `{"result": ...}`.
#[must_use]
pub fn ok_result(result: &UserResult) -> Value {
    respond(200, &json!({ "result": result }))
}

/// Maps an error onto its HTTP status and `{"error": {status, message}}` body.
#[must_use]
pub fn err_from(error: &AdminError) -> Value {
    err_response(error.status_code(), error.status(), &error.to_string())
}

/// Returns an error response with the given status code, callable status and message.
#[must_use]
pub fn err_response(status_code: u16, status: &str, message: &str) -> Value {
    respond(
        status_code,
        &json!({ "error": { "status": status, "message": message } }),
    )
}
