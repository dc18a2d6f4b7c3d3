//! Login, session persistence and error classification.

use std::sync::Arc;

use ev_market_client::api::LoginRequest;
use ev_market_client::session::AuthSession;
use ev_market_client::{ApiClient, ApiError, ClientConfig, ErrorKind, FileStorage, SessionManager};
use ev_market_core::{UserId, UserProfile};
use ev_market_integration_tests::{BUYER_ID, MockBackend, PASSWORD};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: SecretString::from(password.to_string()),
    }
}

#[tokio::test]
async fn test_login_stores_session() {
    let backend = MockBackend::start().await;
    let (client, _storage) = backend.client();

    let session = client
        .login(&login_request("buyer@example.com", PASSWORD))
        .await
        .expect("login should succeed");
    assert_eq!(session.user.user_id, UserId::new(BUYER_ID));
    assert_eq!(session.user.display_name(), "Nguyễn Văn A");

    let token = client.session().token().unwrap().unwrap();
    assert_eq!(token.expose_secret(), "mock-token-1");
    assert!(client.session().is_authenticated().unwrap());
}

#[tokio::test]
async fn test_bad_credentials_surface_as_401() {
    let backend = MockBackend::start().await;
    let (client, _storage) = backend.client();

    let err = client
        .login(&login_request("buyer@example.com", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.kind(), ErrorKind::Client);
    assert_eq!(err.user_message(), "Email hoặc mật khẩu không đúng");
    assert!(!client.session().is_authenticated().unwrap());
}

#[tokio::test]
async fn test_rejected_token_clears_session() {
    let backend = MockBackend::start().await;
    let (client, _storage) = backend.client();
    client
        .session()
        .set(&AuthSession {
            token: SecretString::from("expired".to_string()),
            user: UserProfile {
                user_id: UserId::new(BUYER_ID),
                email: "buyer@example.com".to_string(),
                ..UserProfile::default()
            },
            profile: None,
        })
        .unwrap();

    let err = client.list_favorites(UserId::new(BUYER_ID)).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(err.data().is_some());

    assert!(client.clear_session_if_unauthorized(&err));
    assert!(client.session().load().unwrap().is_none());
}

#[tokio::test]
async fn test_network_error_has_no_status() {
    // Nothing listens on the discard port
    let config = ClientConfig::new(Url::parse("http://127.0.0.1:9").unwrap());
    let client = ApiClient::new(&config, Arc::new(ev_market_client::MemoryStorage::new())).unwrap();

    let err = client.list_products().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.status(), None);
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.is_feature_unavailable());
}

#[tokio::test]
async fn test_session_survives_restart_with_file_storage() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let first = ApiClient::new(&backend.config(), Arc::new(FileStorage::new(&path))).unwrap();
    first
        .login(&login_request("buyer@example.com", PASSWORD))
        .await
        .unwrap();

    let restarted = SessionManager::new(Arc::new(FileStorage::new(&path)));
    assert_eq!(restarted.user_id().unwrap(), Some(UserId::new(BUYER_ID)));

    first.logout().unwrap();
    assert!(restarted.load().unwrap().is_none());
}
