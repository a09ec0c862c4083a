//! Identity toolkit REST client (admin surface, bearer-token authenticated).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value, json};
use tracing::{debug, info};
use url::Url;

use super::IdentityProvider;
use super::http::{endpoint, read_json};
use crate::core::models::{CredentialPatch, NewCredential};
use crate::errors::AdminError;

pub struct IdentityToolkitClient {
    http: Client,
    base_url: Url,
    project_id: String,
    access_token: String,
}

impl IdentityToolkitClient {
    pub fn new(http: Client, base_url: Url, project_id: String, access_token: String) -> Self {
        Self {
            http,
            base_url,
            project_id,
            access_token,
        }
    }

    async fn post(&self, action: &str, body: &Value) -> Result<Value, AdminError> {
        let url = endpoint(
            &self.base_url,
            &format!("v1/projects/{}/{}", self.project_id, action),
        )?;
        debug!(%url, "Calling identity toolkit");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;

        read_json(response, action).await
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    async fn create_credential(&self, credential: &NewCredential) -> Result<String, AdminError> {
        let body = json!({
            "email": credential.email,
            "password": credential.password.expose(),
            "displayName": credential.display_name,
        });

        let created = self.post("accounts", &body).await?;
        let uid = created
            .get("localId")
            .and_then(Value::as_str)
            .filter(|uid| !uid.is_empty())
            .ok_or_else(|| {
                AdminError::UpstreamFailure("accounts response is missing localId".to_string())
            })?;

        info!(uid, "Identity credential created");
        Ok(uid.to_string())
    }

    async fn update_credential(
        &self,
        uid: &str,
        patch: &CredentialPatch,
    ) -> Result<(), AdminError> {
        let mut body = Map::new();
        body.insert("localId".into(), Value::from(uid));
        if let Some(email) = &patch.email {
            body.insert("email".into(), Value::from(email.as_str()));
        }
        if let Some(password) = &patch.password {
            body.insert("password".into(), Value::from(password.expose()));
        }
        if let Some(display_name) = &patch.display_name {
            body.insert("displayName".into(), Value::from(display_name.as_str()));
        }

        self.post("accounts:update", &Value::Object(body)).await?;
        Ok(())
    }

    async fn delete_credential(&self, uid: &str) -> Result<(), AdminError> {
        self.post("accounts:delete", &json!({ "localId": uid }))
            .await?;
        Ok(())
    }
}
