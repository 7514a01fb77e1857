use chrono::Duration;
use shiftboard_db::models::{EmployeeCredentials, tenant_document_key};
use shiftboard_services::DaoError;

use crate::fixtures::seed::seed_tenant;
use crate::fixtures::test_app::TestCore;

#[tokio::test]
async fn default_password_is_employee_id() {
    let core = TestCore::new();
    let credentials = &core.state.credentials;
    let tenant_id = seed_tenant(&core.state, "acme").await;

    assert!(credentials.verify(tenant_id, "E1", "E1").await.unwrap());
    assert!(credentials.verify(tenant_id, "E1", " E1 ").await.unwrap());
    assert!(!credentials.verify(tenant_id, "E1", "E2").await.unwrap());

    let err = credentials
        .authenticate(tenant_id, "E1", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::InvalidCredentials));
}

#[tokio::test]
async fn set_password_replaces_default() {
    let core = TestCore::new();
    let credentials = &core.state.credentials;
    let tenant_id = seed_tenant(&core.state, "acme").await;

    credentials
        .set_password(tenant_id, "E1", "s3cret")
        .await
        .unwrap();

    assert!(credentials.verify(tenant_id, "E1", "s3cret").await.unwrap());
    assert!(!credentials.verify(tenant_id, "E1", "E1").await.unwrap());

    let stored = credentials.get(tenant_id, "E1").await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "s3cret");
    assert!(stored.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn set_password_validates_input_and_employee() {
    let core = TestCore::new();
    let credentials = &core.state.credentials;
    let tenant_id = seed_tenant(&core.state, "acme").await;

    let err = credentials
        .set_password(tenant_id, "E1", "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::Validation(_)));

    let err = credentials
        .set_password(tenant_id, "NOPE", "s3cret")
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::NotFound(_)));
}

#[tokio::test]
async fn reset_token_flow() {
    let core = TestCore::new();
    let credentials = &core.state.credentials;
    let tenant_id = seed_tenant(&core.state, "acme").await;

    let token = credentials
        .issue_reset_token(tenant_id, "E2", "bob@acme.test")
        .await
        .unwrap();
    assert_eq!(token.len(), 32);
    assert_eq!(
        credentials.validate_reset_token(tenant_id, &token).await.unwrap(),
        "E2"
    );

    let stored = credentials.get(tenant_id, "E2").await.unwrap().unwrap();
    assert_eq!(stored.email.as_deref(), Some("bob@acme.test"));
    assert_ne!(stored.reset_token_hash.as_deref(), Some(token.as_str()));

    assert!(
        credentials
            .consume_reset_token(tenant_id, &token, "n3w-pass")
            .await
            .unwrap()
    );
    assert!(credentials.verify(tenant_id, "E2", "n3w-pass").await.unwrap());

    // Single use
    assert!(
        !credentials
            .consume_reset_token(tenant_id, &token, "other")
            .await
            .unwrap()
    );
    let err = credentials
        .validate_reset_token(tenant_id, &token)
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::TokenInvalid));
}

#[tokio::test]
async fn expired_token_is_refused() {
    let core = TestCore::new();
    let credentials = &core.state.credentials;
    let tenant_id = seed_tenant(&core.state, "acme").await;

    let token = credentials
        .issue_reset_token(tenant_id, "E1", "alice@acme.test")
        .await
        .unwrap();
    core.clock.advance(Duration::hours(24));

    let err = credentials
        .validate_reset_token(tenant_id, &token)
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::TokenExpired));
    assert!(
        !credentials
            .consume_reset_token(tenant_id, &token, "n3w-pass")
            .await
            .unwrap()
    );
    assert!(credentials.verify(tenant_id, "E1", "E1").await.unwrap());
}

#[tokio::test]
async fn new_token_replaces_outstanding_one() {
    let core = TestCore::new();
    let credentials = &core.state.credentials;
    let tenant_id = seed_tenant(&core.state, "acme").await;

    let first = credentials
        .issue_reset_token(tenant_id, "E1", "alice@acme.test")
        .await
        .unwrap();
    let second = credentials
        .issue_reset_token(tenant_id, "E1", "alice@acme.test")
        .await
        .unwrap();

    assert!(matches!(
        credentials.validate_reset_token(tenant_id, &first).await,
        Err(DaoError::TokenInvalid)
    ));
    assert_eq!(
        credentials.validate_reset_token(tenant_id, &second).await.unwrap(),
        "E1"
    );
}

#[tokio::test]
async fn reset_requires_valid_email_and_active_credential() {
    let core = TestCore::new();
    let credentials = &core.state.credentials;
    let tenant_id = seed_tenant(&core.state, "acme").await;

    let err = credentials
        .issue_reset_token(tenant_id, "E1", "not-an-email")
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::Validation(_)));

    credentials.deactivate(tenant_id, "E1").await.unwrap();
    let err = credentials
        .issue_reset_token(tenant_id, "E1", "alice@acme.test")
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::InactiveCredential(_)));

    credentials.reactivate(tenant_id, "E1").await.unwrap();
    assert!(credentials.verify(tenant_id, "E1", "E1").await.unwrap());
}

#[tokio::test]
async fn plain_tokens_never_reach_storage() {
    let core = TestCore::new();
    let tenant_id = seed_tenant(&core.state, "acme").await;

    let token = core
        .state
        .credentials
        .issue_reset_token(tenant_id, "E3", "carol@acme.test")
        .await
        .unwrap();

    let raw = core
        .store
        .raw(&tenant_document_key(tenant_id, EmployeeCredentials::DOCUMENT))
        .expect("credentials persisted");
    let text = String::from_utf8(raw).unwrap();
    assert!(!text.contains(&token));
    assert!(text.contains("carol@acme.test"));
}
