//! Document store REST client.
//!
//! Every mutation goes through the `documents:commit` endpoint with a single
//! write, which is the only way to get a server timestamp transform and an
//! existence precondition in one request.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value, json};
use tracing::{debug, info};
use url::Url;

use super::ProfileStore;
use super::http::{endpoint, read_json};
use crate::core::models::{ProfileDocument, ProfilePatch};
use crate::errors::AdminError;

pub const CREATED_AT_FIELD: &str = "createdAt";

pub struct FirestoreClient {
    http: Client,
    base_url: Url,
    project_id: String,
    collection: String,
    access_token: String,
}

impl FirestoreClient {
    pub fn new(
        http: Client,
        base_url: Url,
        project_id: String,
        collection: String,
        access_token: String,
    ) -> Self {
        Self {
            http,
            base_url,
            project_id,
            collection,
            access_token,
        }
    }

    fn database(&self) -> String {
        format!("projects/{}/databases/(default)", self.project_id)
    }

    /// Full resource name of the profile document for `uid`.
    #[must_use]
    pub fn document_name(&self, uid: &str) -> String {
        format!("{}/documents/{}/{}", self.database(), self.collection, uid)
    }

    async fn commit(&self, write: Value, operation: &str) -> Result<(), AdminError> {
        let url = endpoint(
            &self.base_url,
            &format!("v1/{}/documents:commit", self.database()),
        )?;
        debug!(%url, operation, "Committing profile write");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "writes": [write] }))
            .send()
            .await?;

        read_json(response, operation).await?;
        Ok(())
    }
}

fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

fn boolean_value(value: bool) -> Value {
    json!({ "booleanValue": value })
}

/// Encodes a full profile as typed store fields.
#[must_use]
pub fn document_fields(document: &ProfileDocument) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("uid".into(), string_value(&document.uid));
    fields.insert("email".into(), string_value(&document.email));
    fields.insert("displayName".into(), string_value(&document.display_name));
    fields.insert("role".into(), string_value(&document.role));
    fields.insert("suspended".into(), boolean_value(document.suspended));
    fields
}

/// Encodes only the fields a patch supplies.
#[must_use]
pub fn patch_fields(patch: &ProfilePatch) -> Map<String, Value> {
    let mut fields = Map::new();
    if let Some(display_name) = &patch.display_name {
        fields.insert("displayName".into(), string_value(display_name));
    }
    if let Some(email) = &patch.email {
        fields.insert("email".into(), string_value(email));
    }
    if let Some(role) = &patch.role {
        fields.insert("role".into(), string_value(role));
    }
    if let Some(suspended) = patch.suspended {
        fields.insert("suspended".into(), boolean_value(suspended));
    }
    fields
}

#[async_trait]
impl ProfileStore for FirestoreClient {
    async fn put_document(&self, uid: &str, document: &ProfileDocument) -> Result<(), AdminError> {
        let write = json!({
            "update": {
                "name": self.document_name(uid),
                "fields": document_fields(document),
            },
            "updateTransforms": [
                { "fieldPath": CREATED_AT_FIELD, "setToServerValue": "REQUEST_TIME" }
            ],
        });

        self.commit(write, "put_document").await?;
        info!(uid, "Profile document written");
        Ok(())
    }

    async fn patch_document(&self, uid: &str, patch: &ProfilePatch) -> Result<(), AdminError> {
        let write = json!({
            "update": {
                "name": self.document_name(uid),
                "fields": patch_fields(patch),
            },
            "updateMask": { "fieldPaths": patch.field_names() },
            "currentDocument": { "exists": true },
        });

        self.commit(write, "patch_document").await
    }

    async fn delete_document(&self, uid: &str) -> Result<(), AdminError> {
        let write = json!({
            "delete": self.document_name(uid),
            "currentDocument": { "exists": true },
        });

        self.commit(write, "delete_document").await
    }
}
