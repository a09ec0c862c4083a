use std::sync::Arc;

use admin_users::clients::{InMemoryIdentityProvider, InMemoryProfileStore};
use admin_users::core::models::{
    CreateUserRequest, DeleteUserRequest, Password, UpdateUserRequest,
};
use admin_users::core::principal::Principal;
use admin_users::errors::AdminError;
use admin_users::users::{AdminUserService, Operation};
use serde_json::{Map, Value, json};

struct Harness {
    identity: Arc<InMemoryIdentityProvider>,
    profiles: Arc<InMemoryProfileStore>,
    service: AdminUserService,
}

impl Harness {
    fn new() -> Self {
        let identity = Arc::new(InMemoryIdentityProvider::new());
        let profiles = Arc::new(InMemoryProfileStore::new());
        let service = AdminUserService::new(identity.clone(), profiles.clone());
        Self {
            identity,
            profiles,
            service,
        }
    }

    fn remote_calls(&self) -> usize {
        self.identity.calls() + self.profiles.calls()
    }

    async fn seed(&self, email: &str, display_name: &str) -> String {
        self.service
            .create_user(Some(&admin()), create_request(email, "secret123", display_name))
            .await
            .expect("seed user")
            .uid
    }
}

fn principal_with(claims: Value) -> Principal {
    let claims: Map<String, Value> = claims.as_object().cloned().unwrap_or_default();
    Principal::verified(Some("caller".into()), claims)
}

fn admin() -> Principal {
    principal_with(json!({"admin": true}))
}

fn create_request(email: &str, password: &str, display_name: &str) -> CreateUserRequest {
    CreateUserRequest {
        email: email.into(),
        password: Password::new(password),
        display_name: display_name.into(),
        ..Default::default()
    }
}

fn update_request(uid: &str) -> UpdateUserRequest {
    UpdateUserRequest {
        uid: uid.into(),
        ..Default::default()
    }
}

// ============================================================================
// Authorization
// ============================================================================

#[tokio::test]
async fn test_every_operation_requires_a_caller() {
    let h = Harness::new();

    for operation in [Operation::CreateUser, Operation::UpdateUser, Operation::DeleteUser] {
        let data = json!({"uid": "u1", "email": "a@b.com", "password": "pw", "displayName": "A"});
        let err = h.service.dispatch(operation, None, data).await.unwrap_err();
        assert!(matches!(err, AdminError::Unauthenticated(_)), "{operation:?}: {err:?}");
    }

    assert_eq!(h.remote_calls(), 0);
}

#[tokio::test]
async fn test_every_operation_requires_admin_claim() {
    let h = Harness::new();

    for claims in [json!({}), json!({"admin": false})] {
        let caller = principal_with(claims);
        for operation in [Operation::CreateUser, Operation::UpdateUser, Operation::DeleteUser] {
            let data = json!({"uid": "u1", "email": "a@b.com", "password": "pw", "displayName": "A"});
            let err = h
                .service
                .dispatch(operation, Some(&caller), data)
                .await
                .unwrap_err();
            assert!(matches!(err, AdminError::PermissionDenied(_)), "{operation:?}: {err:?}");
        }
    }

    assert_eq!(h.remote_calls(), 0);
}

#[tokio::test]
async fn test_authorization_precedes_payload_decoding() {
    let h = Harness::new();
    let err = h
        .service
        .dispatch(Operation::CreateUser, None, json!({"email": 42}))
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Unauthenticated(_)));

    let err = h
        .service
        .dispatch(Operation::CreateUser, Some(&admin()), json!({"email": 42}))
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::InvalidArgument(_)));
}

// ============================================================================
// createUser
// ============================================================================

#[tokio::test]
async fn test_create_rejects_missing_fields_without_remote_calls() {
    let h = Harness::new();
    let cases = [
        create_request("", "secret123", "Ann"),
        create_request("a@b.com", "", "Ann"),
        create_request("a@b.com", "secret123", ""),
    ];

    for request in cases {
        let err = h
            .service
            .create_user(Some(&admin()), request)
            .await
            .unwrap_err();
        match err {
            AdminError::InvalidArgument(msg) => assert_eq!(msg, "Missing required fields"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    let err = h
        .service
        .dispatch(Operation::CreateUser, Some(&admin()), json!({"email": "a@b.com", "displayName": null}))
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::InvalidArgument(_)));

    assert_eq!(h.remote_calls(), 0);
}

#[tokio::test]
async fn test_create_writes_credential_and_default_profile() {
    let h = Harness::new();
    let result = h
        .service
        .create_user(Some(&admin()), create_request("a@b.com", "secret123", "Ann"))
        .await
        .unwrap();

    assert_eq!(result.message, "User created");
    assert!(!result.uid.is_empty());

    let record = h.identity.record(&result.uid).expect("credential");
    assert_eq!(record.email, "a@b.com");
    assert_eq!(record.display_name, "Ann");
    assert_eq!(record.password.expose(), "secret123");

    let stored = h.profiles.document(&result.uid).expect("profile");
    assert_eq!(stored.document.uid, result.uid);
    assert_eq!(stored.document.email, "a@b.com");
    assert_eq!(stored.document.display_name, "Ann");
    assert_eq!(stored.document.role, "user");
    assert!(!stored.document.suspended);
    assert!(stored.created_at <= chrono::Utc::now());
}

#[tokio::test]
async fn test_create_keeps_explicit_role_and_suspension() {
    let h = Harness::new();
    let data = json!({
        "email": "ed@b.com",
        "password": "secret123",
        "displayName": "Ed",
        "role": "editor",
        "suspended": true
    });
    let result = h
        .service
        .dispatch(Operation::CreateUser, Some(&admin()), data)
        .await
        .unwrap();

    let stored = h.profiles.document(&result.uid).unwrap();
    assert_eq!(stored.document.role, "editor");
    assert!(stored.document.suspended);
}

#[tokio::test]
async fn test_create_does_not_roll_back_credential_when_profile_write_fails() {
    let h = Harness::new();
    h.profiles.set_unavailable(true);

    let err = h
        .service
        .create_user(Some(&admin()), create_request("a@b.com", "secret123", "Ann"))
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::UpstreamFailure(_)));
    assert_eq!(h.identity.len(), 1);
    assert!(h.profiles.is_empty());
}

#[tokio::test]
async fn test_typed_create_with_empty_role_gets_default_role() {
    let h = Harness::new();
    let request = CreateUserRequest {
        role: Some(String::new()),
        ..create_request("a@b.com", "secret123", "Ann")
    };
    let uid = h
        .service
        .create_user(Some(&admin()), request)
        .await
        .unwrap()
        .uid;

    assert_eq!(h.profiles.document(&uid).unwrap().document.role, "user");
}

#[tokio::test]
async fn test_create_with_taken_email_fails_upstream_before_profile_write() {
    let h = Harness::new();
    h.seed("a@b.com", "Ann").await;
    let profile_calls = h.profiles.calls();

    let err = h
        .service
        .create_user(Some(&admin()), create_request("a@b.com", "other", "Other"))
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::UpstreamFailure(_)));
    assert_eq!(h.profiles.calls(), profile_calls);
}

// ============================================================================
// updateUser
// ============================================================================

#[tokio::test]
async fn test_update_requires_uid() {
    let h = Harness::new();
    let err = h
        .service
        .update_user(Some(&admin()), update_request(""))
        .await
        .unwrap_err();
    match err {
        AdminError::InvalidArgument(msg) => assert_eq!(msg, "Missing UID"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.remote_calls(), 0);
}

#[tokio::test]
async fn test_update_suspended_false_only_touches_profile() {
    let h = Harness::new();
    let data = json!({"email": "a@b.com", "password": "secret123", "displayName": "Ann", "suspended": true});
    let uid = h
        .service
        .dispatch(Operation::CreateUser, Some(&admin()), data)
        .await
        .unwrap()
        .uid;
    let identity_calls = h.identity.calls();

    let result = h
        .service
        .dispatch(Operation::UpdateUser, Some(&admin()), json!({"uid": uid, "suspended": false}))
        .await
        .unwrap();

    assert_eq!(result.message, "User updated");
    assert_eq!(h.identity.calls(), identity_calls);
    let stored = h.profiles.document(&uid).unwrap();
    assert!(!stored.document.suspended);
    assert_eq!(stored.document.display_name, "Ann");
}

#[tokio::test]
async fn test_update_without_fields_makes_no_calls() {
    let h = Harness::new();
    let result = h
        .service
        .update_user(Some(&admin()), update_request("u1"))
        .await
        .unwrap();

    assert_eq!(result.message, "User updated");
    assert_eq!(result.uid, "u1");
    assert_eq!(h.remote_calls(), 0);
}

#[tokio::test]
async fn test_update_ignores_empty_strings_and_non_boolean_suspension() {
    let h = Harness::new();
    let data = json!({"uid": "u1", "email": "", "displayName": "", "role": "", "suspended": "yes"});
    h.service
        .dispatch(Operation::UpdateUser, Some(&admin()), data)
        .await
        .unwrap();

    assert_eq!(h.remote_calls(), 0);
}

#[tokio::test]
async fn test_typed_update_treats_empty_strings_as_not_supplied() {
    let h = Harness::new();
    let uid = h.seed("a@b.com", "Ann").await;
    let calls_before = h.remote_calls();

    let request = UpdateUserRequest {
        email: Some(String::new()),
        password: Some(Password::new("")),
        display_name: Some(String::new()),
        role: Some(String::new()),
        ..update_request(&uid)
    };
    let result = h.service.update_user(Some(&admin()), request).await.unwrap();

    assert_eq!(result.message, "User updated");
    assert_eq!(h.remote_calls(), calls_before);
    let record = h.identity.record(&uid).unwrap();
    assert_eq!(record.email, "a@b.com");
    assert_eq!(record.display_name, "Ann");
    let stored = h.profiles.document(&uid).unwrap();
    assert_eq!(stored.document.email, "a@b.com");
    assert_eq!(stored.document.display_name, "Ann");
    assert_eq!(stored.document.role, "user");
}

#[tokio::test]
async fn test_update_keeps_credential_change_when_profile_patch_fails() {
    let h = Harness::new();
    let uid = h.seed("a@b.com", "Ann").await;
    h.profiles.set_unavailable(true);

    let request = UpdateUserRequest {
        display_name: Some("Annie".into()),
        ..update_request(&uid)
    };
    let err = h
        .service
        .update_user(Some(&admin()), request)
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::UpstreamFailure(_)));
    assert_eq!(h.identity.record(&uid).unwrap().display_name, "Annie");
    h.profiles.set_unavailable(false);
    assert_eq!(h.profiles.document(&uid).unwrap().document.display_name, "Ann");
}

#[tokio::test]
async fn test_update_splits_fields_between_stores() {
    let h = Harness::new();
    let uid = h.seed("a@b.com", "Ann").await;

    let request = UpdateUserRequest {
        uid: uid.clone(),
        email: Some("ann@b.com".into()),
        password: Some(Password::new("new-secret")),
        display_name: Some("Annie".into()),
        role: Some("admin".into()),
        suspended: None,
    };
    h.service.update_user(Some(&admin()), request).await.unwrap();

    let record = h.identity.record(&uid).unwrap();
    assert_eq!(record.email, "ann@b.com");
    assert_eq!(record.display_name, "Annie");
    assert_eq!(record.password.expose(), "new-secret");

    let stored = h.profiles.document(&uid).unwrap();
    assert_eq!(stored.document.email, "ann@b.com");
    assert_eq!(stored.document.display_name, "Annie");
    assert_eq!(stored.document.role, "admin");
    assert!(!stored.document.suspended);
}

#[tokio::test]
async fn test_password_only_update_skips_profile() {
    let h = Harness::new();
    let uid = h.seed("a@b.com", "Ann").await;
    let profile_calls = h.profiles.calls();

    let request = UpdateUserRequest {
        password: Some(Password::new("rotated")),
        ..update_request(&uid)
    };
    h.service.update_user(Some(&admin()), request).await.unwrap();

    assert_eq!(h.profiles.calls(), profile_calls);
    assert_eq!(h.identity.record(&uid).unwrap().password.expose(), "rotated");
}

#[tokio::test]
async fn test_repeated_update_is_idempotent() {
    let h = Harness::new();
    let uid = h.seed("a@b.com", "Ann").await;
    let patch = json!({"uid": uid, "displayName": "Annie", "role": "editor", "suspended": true});

    h.service
        .dispatch(Operation::UpdateUser, Some(&admin()), patch.clone())
        .await
        .unwrap();
    let first_profile = h.profiles.document(&uid).unwrap();
    let first_record = h.identity.record(&uid).unwrap();

    h.service
        .dispatch(Operation::UpdateUser, Some(&admin()), patch)
        .await
        .unwrap();

    assert_eq!(h.profiles.document(&uid).unwrap(), first_profile);
    assert_eq!(h.identity.record(&uid).unwrap(), first_record);
}

#[tokio::test]
async fn test_update_of_unknown_uid_fails_upstream() {
    let h = Harness::new();
    let request = UpdateUserRequest {
        display_name: Some("Ghost".into()),
        ..update_request("missing")
    };
    let err = h
        .service
        .update_user(Some(&admin()), request)
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::UpstreamFailure(_)));
    // Identity failed first, so the profile store was never asked.
    assert_eq!(h.profiles.calls(), 0);
}

// ============================================================================
// deleteUser
// ============================================================================

#[tokio::test]
async fn test_delete_requires_uid() {
    let h = Harness::new();
    let err = h
        .service
        .dispatch(Operation::DeleteUser, Some(&admin()), Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::InvalidArgument(_)));
    assert_eq!(h.remote_calls(), 0);
}

#[tokio::test]
async fn test_delete_removes_both_records_then_fails_on_repeat() {
    let h = Harness::new();
    let uid = h.seed("a@b.com", "Ann").await;

    let result = h
        .service
        .delete_user(Some(&admin()), DeleteUserRequest { uid: uid.clone() })
        .await
        .unwrap();
    assert_eq!(result.message, "User deleted");
    assert_eq!(result.uid, uid);
    assert!(h.identity.record(&uid).is_none());
    assert!(h.profiles.document(&uid).is_none());

    let err = h
        .service
        .delete_user(Some(&admin()), DeleteUserRequest { uid })
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::UpstreamFailure(_)));
}

#[tokio::test]
async fn test_delete_leaves_profile_when_identity_delete_fails() {
    let h = Harness::new();
    let uid = h.seed("a@b.com", "Ann").await;
    h.identity.set_unavailable(true);

    let err = h
        .service
        .delete_user(Some(&admin()), DeleteUserRequest { uid: uid.clone() })
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::UpstreamFailure(_)));
    assert!(h.profiles.document(&uid).is_some());
}

#[tokio::test]
async fn test_delete_keeps_profile_when_profile_delete_fails_after_credential_removal() {
    let h = Harness::new();
    let uid = h.seed("a@b.com", "Ann").await;
    h.profiles.set_unavailable(true);

    let err = h
        .service
        .delete_user(Some(&admin()), DeleteUserRequest { uid: uid.clone() })
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::UpstreamFailure(_)));
    assert!(h.identity.record(&uid).is_none());
    h.profiles.set_unavailable(false);
    assert!(h.profiles.document(&uid).is_some());
}
