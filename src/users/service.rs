//! Admin user lifecycle: authorize, validate, then write identity before profile.
//!
//! The two writes are independent remote calls. When the second one fails the
//! first is left in place and the error goes back to the caller as is.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::clients::http::build_http_client;
use crate::clients::{
    FirestoreClient, IdentityProvider, IdentityToolkitClient, InMemoryIdentityProvider,
    InMemoryProfileStore, ProfileStore,
};
use crate::core::config::{AppConfig, Backend};
use crate::core::models::{
    CreateUserRequest, CredentialPatch, DEFAULT_ROLE, DeleteUserRequest, NewCredential,
    ProfileDocument, ProfilePatch, UpdateUserRequest, UserResult,
};
use crate::core::principal::{Principal, authorize};
use crate::errors::AdminError;

pub const USER_CREATED: &str = "User created";
pub const USER_UPDATED: &str = "User updated";
pub const USER_DELETED: &str = "User deleted";

/// The three callable operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateUser,
    UpdateUser,
    DeleteUser,
}

impl Operation {
    /// Resolves an endpoint name. The `admin*` names are the ones deployed
    /// mobile clients already call.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "createUser" | "adminAddUser" => Some(Self::CreateUser),
            "updateUser" | "adminUpdateUser" => Some(Self::UpdateUser),
            "deleteUser" | "adminDeleteUser" => Some(Self::DeleteUser),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateUser => "createUser",
            Self::UpdateUser => "updateUser",
            Self::DeleteUser => "deleteUser",
        }
    }
}

#[derive(Clone)]
pub struct AdminUserService {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
}

impl AdminUserService {
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { identity, profiles }
    }

    /// Builds both collaborators once for the lifetime of the process.
    ///
    /// # Errors
    ///
    /// Returns an error if the Firebase settings are missing or the HTTP
    /// client can't be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AdminError> {
        match config.backend {
            Backend::Memory => {
                warn!("Using in-memory collaborators; state lives only as long as this process");
                Ok(Self::new(
                    Arc::new(InMemoryIdentityProvider::new()),
                    Arc::new(InMemoryProfileStore::new()),
                ))
            }
            Backend::Firebase => {
                let firebase = config.firebase.as_ref().ok_or_else(|| {
                    AdminError::UpstreamFailure("Firebase settings are not configured".to_string())
                })?;
                let http = build_http_client(config.upstream_timeout)?;

                let identity = IdentityToolkitClient::new(
                    http.clone(),
                    firebase.identity_base_url.clone(),
                    firebase.project_id.clone(),
                    firebase.access_token.clone(),
                );
                let profiles = FirestoreClient::new(
                    http,
                    firebase.profile_store_base_url.clone(),
                    firebase.project_id.clone(),
                    config.profile_collection.clone(),
                    firebase.access_token.clone(),
                );

                Ok(Self::new(Arc::new(identity), Arc::new(profiles)))
            }
        }
    }

    /// Runs `operation` against an untyped callable payload.
    ///
    /// Authorization happens before the payload is even decoded.
    ///
    /// # Errors
    ///
    /// Any of the operation's failure kinds; an undecodable payload is
    /// `InvalidArgument`.
    #[tracing::instrument(level = "info", skip_all, fields(operation = operation.as_str()))]
    pub async fn dispatch(
        &self,
        operation: Operation,
        principal: Option<&Principal>,
        data: Value,
    ) -> Result<UserResult, AdminError> {
        authorize(principal)?;

        match operation {
            Operation::CreateUser => self.create_authorized(decode(data)?).await,
            Operation::UpdateUser => self.update_authorized(decode(data)?).await,
            Operation::DeleteUser => self.delete_authorized(decode(data)?).await,
        }
    }

    /// # Errors
    ///
    /// `Unauthenticated`/`PermissionDenied` from the admin gate,
    /// `InvalidArgument` if email, password or display name is empty, and
    /// `UpstreamFailure` from either store.
    pub async fn create_user(
        &self,
        principal: Option<&Principal>,
        request: CreateUserRequest,
    ) -> Result<UserResult, AdminError> {
        authorize(principal)?;
        self.create_authorized(request).await
    }

    /// # Errors
    ///
    /// Admin gate failures, `InvalidArgument` for an empty uid, and
    /// `UpstreamFailure` from either store.
    pub async fn update_user(
        &self,
        principal: Option<&Principal>,
        request: UpdateUserRequest,
    ) -> Result<UserResult, AdminError> {
        authorize(principal)?;
        self.update_authorized(request).await
    }

    /// # Errors
    ///
    /// Admin gate failures, `InvalidArgument` for an empty uid, and
    /// `UpstreamFailure` from either store, including when the user is
    /// already gone.
    pub async fn delete_user(
        &self,
        principal: Option<&Principal>,
        request: DeleteUserRequest,
    ) -> Result<UserResult, AdminError> {
        authorize(principal)?;
        self.delete_authorized(request).await
    }

    async fn create_authorized(&self, request: CreateUserRequest) -> Result<UserResult, AdminError> {
        if request.email.is_empty() || request.password.is_empty() || request.display_name.is_empty()
        {
            return Err(AdminError::InvalidArgument(
                "Missing required fields".to_string(),
            ));
        }

        let credential = NewCredential {
            email: request.email,
            password: request.password,
            display_name: request.display_name,
        };
        let uid = self.identity.create_credential(&credential).await?;

        let document = ProfileDocument {
            uid: uid.clone(),
            email: credential.email,
            display_name: credential.display_name,
            role: non_empty(request.role).unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            suspended: request.suspended.unwrap_or(false),
        };
        if let Err(e) = self.profiles.put_document(&uid, &document).await {
            warn!(uid = %uid, "Credential created but profile write failed: {}", e);
            return Err(e);
        }

        info!(uid = %uid, role = %document.role, "User created");
        Ok(UserResult::new(USER_CREATED, uid))
    }

    async fn update_authorized(&self, request: UpdateUserRequest) -> Result<UserResult, AdminError> {
        if request.uid.is_empty() {
            return Err(AdminError::InvalidArgument("Missing UID".to_string()));
        }

        let email = non_empty(request.email);
        let display_name = non_empty(request.display_name);
        let credential_patch = CredentialPatch {
            email: email.clone(),
            password: request.password.filter(|p| !p.is_empty()),
            display_name: display_name.clone(),
        };
        let profile_patch = ProfilePatch {
            display_name,
            email,
            role: non_empty(request.role),
            suspended: request.suspended,
        };
        let uid = request.uid;

        if !credential_patch.is_empty() {
            self.identity
                .update_credential(&uid, &credential_patch)
                .await?;
        }

        if !profile_patch.is_empty() {
            if let Err(e) = self.profiles.patch_document(&uid, &profile_patch).await {
                if !credential_patch.is_empty() {
                    warn!(uid = %uid, "Credential updated but profile patch failed: {}", e);
                }
                return Err(e);
            }
        }

        info!(
            uid = %uid,
            credential_changed = !credential_patch.is_empty(),
            profile_fields = ?profile_patch.field_names(),
            "User updated"
        );
        Ok(UserResult::new(USER_UPDATED, uid))
    }

    async fn delete_authorized(&self, request: DeleteUserRequest) -> Result<UserResult, AdminError> {
        if request.uid.is_empty() {
            return Err(AdminError::InvalidArgument("Missing UID".to_string()));
        }
        let uid = request.uid;

        self.identity.delete_credential(&uid).await?;
        if let Err(e) = self.profiles.delete_document(&uid).await {
            warn!(uid = %uid, "Credential deleted but profile delete failed: {}", e);
            return Err(e);
        }

        info!(uid = %uid, "User deleted");
        Ok(UserResult::new(USER_DELETED, uid))
    }
}

/// Empty strings count as not supplied, whichever way the request was built.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T, AdminError> {
    let data = if data.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        data
    };
    serde_json::from_value(data)
        .map_err(|e| AdminError::InvalidArgument(format!("Invalid request payload: {e}")))
}
