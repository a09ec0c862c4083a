//! Caller identity as handed over by the transport layer.

use serde_json::{Map, Value};

use crate::errors::AdminError;

pub const ADMIN_CLAIM: &str = "admin";

/// A caller whose token was verified upstream, together with its claims.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Principal {
    pub uid: Option<String>,
    pub verified: bool,
    pub claims: Map<String, Value>,
}

impl Principal {
    #[must_use]
    pub fn verified(uid: Option<String>, claims: Map<String, Value>) -> Self {
        Self {
            uid,
            verified: true,
            claims,
        }
    }

    /// True only for a boolean `admin: true` claim.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self.claims.get(ADMIN_CLAIM), Some(Value::Bool(true)))
    }
}

/// Gate shared by every admin operation.
///
/// # Errors
///
/// `Unauthenticated` when no verified principal is attached, `PermissionDenied`
/// when the principal lacks the admin claim.
pub fn authorize(principal: Option<&Principal>) -> Result<&Principal, AdminError> {
    let Some(principal) = principal.filter(|p| p.verified) else {
        return Err(AdminError::Unauthenticated(
            "You must be signed in.".to_string(),
        ));
    };

    if !principal.is_admin() {
        return Err(AdminError::PermissionDenied(
            "Only admins can perform this action.".to_string(),
        ));
    }

    Ok(principal)
}
