//! API Lambda handler - thin router in front of `AdminUserService`.
//!
//! This module handles:
//! - Resolving the operation from the request path
//! - Unwrapping the callable `{"data": ...}` envelope
//! - Building the caller's principal from the gateway authorizer
//! - Mapping results and errors onto HTTP responses

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info, warn};

use super::{helpers, parsing};
use crate::core::principal::authorize;
use crate::errors::AdminError;
use crate::users::{AdminUserService, Operation};

pub use self::function_handler as handler;

/// Lambda handler for the admin endpoints.
///
/// Every outcome, including caller mistakes, is returned as a response
/// payload; the `Err` branch is reserved for runtime-level failures.
#[tracing::instrument(level = "info", skip_all, fields(request_id = %event.context.request_id))]
pub async fn function_handler(
    service: &AdminUserService,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    let payload = event.payload;

    // ========================================================================
    // Route
    // ========================================================================

    let Some(operation) = parsing::endpoint_name(&payload).and_then(Operation::from_name) else {
        let path = parsing::endpoint_name(&payload).unwrap_or_default();
        warn!(path = %path, "No admin operation matches request path");
        return Ok(helpers::err_response(
            404,
            "NOT_FOUND",
            &format!("Unknown operation '{path}'"),
        ));
    };

    // ========================================================================
    // Caller identity and payload
    // ========================================================================

    let principal = parsing::principal_from_event(&payload);
    info!(
        operation = operation.as_str(),
        caller = principal.as_ref().and_then(|p| p.uid.as_deref()).unwrap_or("anonymous"),
        "Admin request received"
    );

    let outcome = match parsing::callable_data(&payload) {
        Ok(data) => service.dispatch(operation, principal.as_ref(), data).await,
        // Bad bodies still go through the admin gate first.
        Err(parse_error) => authorize(principal.as_ref()).and(Err(parse_error)),
    };

    Ok(match outcome {
        Ok(result) => {
            info!(operation = operation.as_str(), uid = %result.uid, "{}", result.message);
            helpers::ok_result(&result)
        }
        Err(e) => {
            log_failure(operation, &e);
            helpers::err_from(&e)
        }
    })
}

fn log_failure(operation: Operation, e: &AdminError) {
    match e {
        AdminError::UpstreamFailure(_) => {
            error!(operation = operation.as_str(), status = e.status(), "{}", e);
        }
        _ => warn!(operation = operation.as_str(), status = e.status(), "{}", e),
    }
}
