//! Process-local collaborators.
//!
//! They follow the same contracts as the hosted services: uids are generated
//! on create, emails are unique, and touching a missing record is an upstream
//! failure. Each keeps a call counter so callers can check that nothing was
//! attempted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{IdentityProvider, ProfileStore};
use crate::core::models::{CredentialPatch, NewCredential, Password, ProfileDocument, ProfilePatch};
use crate::errors::AdminError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub uid: String,
    pub email: String,
    pub password: Password,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProfile {
    pub document: ProfileDocument,
    pub created_at: DateTime<Utc>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AdminError> {
    mutex
        .lock()
        .map_err(|_| AdminError::UpstreamFailure("in-memory store lock poisoned".to_string()))
}

fn check_available(unavailable: &AtomicBool, service: &str) -> Result<(), AdminError> {
    if unavailable.load(Ordering::SeqCst) {
        return Err(AdminError::UpstreamFailure(format!("{service} unavailable")));
    }
    Ok(())
}

#[derive(Default)]
pub struct InMemoryIdentityProvider {
    records: Mutex<HashMap<String, CredentialRecord>>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls received, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes every subsequent call fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn record(&self, uid: &str) -> Option<CredentialRecord> {
        self.records.lock().ok()?.get(uid).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn begin(&self) -> Result<(), AdminError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        check_available(&self.unavailable, "identity provider")
    }
}

fn email_taken(records: &HashMap<String, CredentialRecord>, email: &str, except: &str) -> bool {
    records
        .values()
        .any(|r| r.uid != except && r.email.eq_ignore_ascii_case(email))
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_credential(&self, credential: &NewCredential) -> Result<String, AdminError> {
        self.begin()?;
        let mut records = lock(&self.records)?;

        if email_taken(&records, &credential.email, "") {
            return Err(AdminError::UpstreamFailure("EMAIL_EXISTS".to_string()));
        }

        let uid = Uuid::new_v4().simple().to_string();
        records.insert(
            uid.clone(),
            CredentialRecord {
                uid: uid.clone(),
                email: credential.email.clone(),
                password: credential.password.clone(),
                display_name: credential.display_name.clone(),
            },
        );
        Ok(uid)
    }

    async fn update_credential(
        &self,
        uid: &str,
        patch: &CredentialPatch,
    ) -> Result<(), AdminError> {
        self.begin()?;
        let mut records = lock(&self.records)?;

        if let Some(email) = &patch.email {
            if email_taken(&records, email, uid) {
                return Err(AdminError::UpstreamFailure("EMAIL_EXISTS".to_string()));
            }
        }

        let record = records
            .get_mut(uid)
            .ok_or_else(|| AdminError::UpstreamFailure("USER_NOT_FOUND".to_string()))?;
        if let Some(email) = &patch.email {
            record.email.clone_from(email);
        }
        if let Some(password) = &patch.password {
            record.password = password.clone();
        }
        if let Some(display_name) = &patch.display_name {
            record.display_name.clone_from(display_name);
        }
        Ok(())
    }

    async fn delete_credential(&self, uid: &str) -> Result<(), AdminError> {
        self.begin()?;
        lock(&self.records)?
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| AdminError::UpstreamFailure("USER_NOT_FOUND".to_string()))
    }
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    documents: Mutex<HashMap<String, StoredProfile>>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn document(&self, uid: &str) -> Option<StoredProfile> {
        self.documents.lock().ok()?.get(uid).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|d| d.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn begin(&self) -> Result<(), AdminError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        check_available(&self.unavailable, "profile store")
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn put_document(&self, uid: &str, document: &ProfileDocument) -> Result<(), AdminError> {
        self.begin()?;
        lock(&self.documents)?.insert(
            uid.to_string(),
            StoredProfile {
                document: document.clone(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn patch_document(&self, uid: &str, patch: &ProfilePatch) -> Result<(), AdminError> {
        self.begin()?;
        let mut documents = lock(&self.documents)?;
        let stored = documents
            .get_mut(uid)
            .ok_or_else(|| AdminError::UpstreamFailure(format!("NOT_FOUND: No document to update: {uid}")))?;

        let document = &mut stored.document;
        if let Some(display_name) = &patch.display_name {
            document.display_name.clone_from(display_name);
        }
        if let Some(email) = &patch.email {
            document.email.clone_from(email);
        }
        if let Some(role) = &patch.role {
            document.role.clone_from(role);
        }
        if let Some(suspended) = patch.suspended {
            document.suspended = suspended;
        }
        Ok(())
    }

    async fn delete_document(&self, uid: &str) -> Result<(), AdminError> {
        self.begin()?;
        lock(&self.documents)?
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| AdminError::UpstreamFailure(format!("NOT_FOUND: No document to delete: {uid}")))
    }
}
