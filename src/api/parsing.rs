use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};

use crate::core::principal::Principal;
use crate::errors::AdminError;

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

/// Last path segment of the request, which names the operation.
pub fn endpoint_name(payload: &Value) -> Option<&str> {
    v_str(payload, &["rawPath"])
        .or_else(|| v_str(payload, &["path"]))
        .and_then(|path| path.trim_end_matches('/').rsplit('/').next())
        .filter(|name| !name.is_empty())
}

/// Extracts the callable `data` field from the request body.
///
/// A missing body or a body without `data` yields `Value::Null`; decoding the
/// operation's request later turns that into the right validation error.
///
/// # Errors
///
/// `InvalidArgument` if the body is not valid base64/UTF-8/JSON.
pub fn callable_data(payload: &Value) -> Result<Value, AdminError> {
    let Some(raw) = v_str(payload, &["body"]) else {
        return Ok(Value::Null);
    };

    let body = if payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        let bytes = STANDARD
            .decode(raw)
            .map_err(|e| AdminError::InvalidArgument(format!("Invalid base64 body: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| AdminError::InvalidArgument(format!("Body is not UTF-8: {e}")))?
    } else {
        raw.to_string()
    };

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    let mut parsed: Value = serde_json::from_str(&body)
        .map_err(|e| AdminError::InvalidArgument(format!("Invalid JSON body: {e}")))?;
    Ok(parsed.get_mut("data").map(Value::take).unwrap_or(Value::Null))
}

/// Builds the caller's principal from the gateway's verified JWT claims.
///
/// HTTP APIs put them under `requestContext.authorizer.jwt.claims`, REST APIs
/// under `requestContext.authorizer.claims`. No claims means no verified caller.
pub fn principal_from_event(payload: &Value) -> Option<Principal> {
    let claims = v_path(payload, &["requestContext", "authorizer", "jwt", "claims"])
        .or_else(|| v_path(payload, &["requestContext", "authorizer", "claims"]))
        .and_then(Value::as_object)?;

    let claims: Map<String, Value> = claims
        .iter()
        .map(|(k, v)| (k.clone(), normalize_claim(v)))
        .collect();
    let uid = claims
        .get("sub")
        .or_else(|| claims.get("user_id"))
        .and_then(Value::as_str)
        .map(ToString::to_string);

    Some(Principal::verified(uid, claims))
}

/// Gateways stringify scalar claims; turn `"true"`/`"false"` back into booleans.
fn normalize_claim(value: &Value) -> Value {
    match value.as_str() {
        Some("true") => Value::Bool(true),
        Some("false") => Value::Bool(false),
        _ => value.clone(),
    }
}
