//! Collaborator interfaces and their implementations.
//!
//! `IdentityProvider` and `ProfileStore` are the only two seams the service
//! talks through. The REST clients speak to the hosted identity toolkit and
//! document store; the in-memory ones back tests and local runs.

pub mod firestore;
pub mod http;
pub mod identity_toolkit;
pub mod memory;

use async_trait::async_trait;

use crate::core::models::{CredentialPatch, NewCredential, ProfileDocument, ProfilePatch};
use crate::errors::AdminError;

pub use firestore::FirestoreClient;
pub use identity_toolkit::IdentityToolkitClient;
pub use memory::{InMemoryIdentityProvider, InMemoryProfileStore};

/// System of record for credentials.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Allocates a credential record and returns the provider-assigned uid.
    async fn create_credential(&self, credential: &NewCredential) -> Result<String, AdminError>;

    async fn update_credential(&self, uid: &str, patch: &CredentialPatch)
    -> Result<(), AdminError>;

    async fn delete_credential(&self, uid: &str) -> Result<(), AdminError>;
}

/// Per-uid application documents.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Writes the whole document and stamps `createdAt` with the store's clock.
    async fn put_document(&self, uid: &str, document: &ProfileDocument) -> Result<(), AdminError>;

    /// Updates only the patched fields. Fails if the document doesn't exist.
    async fn patch_document(&self, uid: &str, patch: &ProfilePatch) -> Result<(), AdminError>;

    /// Fails if the document doesn't exist.
    async fn delete_document(&self, uid: &str) -> Result<(), AdminError>;
}
