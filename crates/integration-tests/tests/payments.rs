//! Orders, payments, provider redirects and notifications.

use std::sync::Arc;

use ev_market_client::api::{CreateOrder, CreatePayment, LoginRequest};
use ev_market_client::payment_return::{PaymentReturn, parse_payment_return, strip_payment_params};
use ev_market_client::signals::{SignalBus, SignalKind};
use ev_market_client::{ApiClient, ApiError, MemoryStorage};
use ev_market_core::{NotificationId, OrderStatus, PaymentId, PaymentType, ProductId, UserId};
use ev_market_integration_tests::{BUYER_ID, MockBackend, PASSWORD, SELLER_ID};
use rust_decimal::Decimal;
use secrecy::SecretString;
use url::Url;

async fn buyer(backend: &MockBackend) -> (ApiClient, Arc<MemoryStorage>) {
    let (client, storage) = backend.client();
    client
        .login(&LoginRequest {
            email: "buyer@example.com".to_string(),
            password: SecretString::from(PASSWORD.to_string()),
        })
        .await
        .unwrap();
    (client, storage)
}

#[tokio::test]
async fn test_order_then_deposit() {
    let backend = MockBackend::start().await;
    let (client, _storage) = buyer(&backend).await;

    let order = client
        .create_order(&CreateOrder {
            buyer_id: UserId::new(BUYER_ID),
            product_id: ProductId::new(2),
            seller_id: Some(UserId::new(SELLER_ID)),
            total_amount: Decimal::from(600_000_000),
        })
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, Decimal::from(600_000_000));

    let payment = client
        .create_payment(&CreatePayment::for_order(
            order.order_id,
            Decimal::from(60_000_000),
            PaymentType::Deposit,
        ))
        .await
        .unwrap();
    assert_eq!(payment.payment_type, Some(PaymentType::Deposit));
    assert_eq!(payment.order_id, Some(order.order_id));
    assert!(payment.payment_url.is_some());

    let fetched = client.get_payment(payment.payment_id).await.unwrap();
    assert_eq!(fetched.status, "Success");
    assert_eq!(fetched.amount, Decimal::from(60_000_000));
}

#[tokio::test]
async fn test_verification_payment() {
    let backend = MockBackend::start().await;
    let (client, _storage) = buyer(&backend).await;

    let payment = client
        .create_payment(&CreatePayment::verification(
            ProductId::new(4),
            Decimal::from(100_000),
        ))
        .await
        .unwrap();
    assert_eq!(payment.payment_type, Some(PaymentType::Verification));
    assert_eq!(payment.product_id, Some(ProductId::new(4)));

    let fetched = client.get_payment(payment.payment_id).await.unwrap();
    assert_eq!(fetched.payment_type, Some(PaymentType::Verification));
}

#[tokio::test]
async fn test_payment_without_type_is_not_guessed() {
    let backend = MockBackend::start().await;
    let (client, _storage) = buyer(&backend).await;

    backend.state.payments.lock().unwrap().push(serde_json::json!({
        "paymentId": 900,
        "productId": 4,
        "amount": 100_000,
        "status": "Pending",
    }));

    let payment = client.get_payment(PaymentId::new(900)).await.unwrap();
    assert_eq!(payment.payment_type, None);
    assert_eq!(payment.product_id, Some(ProductId::new(4)));
}

#[tokio::test]
async fn test_inconsistent_payment_never_sent() {
    let backend = MockBackend::start().await;
    let (client, _storage) = buyer(&backend).await;

    let err = client
        .create_payment(&CreatePayment::verification(ProductId::new(4), Decimal::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert_eq!(err.status(), None);
    assert!(!backend.state.received("POST", "/api/Payment"));
}

#[tokio::test]
async fn test_redirect_signals_other_windows() {
    let storage = Arc::new(MemoryStorage::new());
    let bus = SignalBus::new(storage.clone());
    let mut other_window = bus.listen().unwrap();

    let url = Url::parse(
        "https://shop.test/orders/7?vnp_ResponseCode=00&vnp_TxnRef=101&vnp_Amount=6000000000",
    )
    .unwrap();
    let Some(PaymentReturn::Success(details)) = parse_payment_return(&url) else {
        panic!("expected a successful payment return");
    };
    assert_eq!(details.amount, Some(Decimal::from(60_000_000)));

    let payment_id = details.payment_id().unwrap();
    SignalBus::new(storage)
        .publish(SignalKind::PaymentCompleted {
            payment_id,
            amount: details.amount,
        })
        .unwrap();

    let received = other_window.poll().unwrap();
    assert_eq!(received.len(), 1);
    assert!(matches!(
        received[0].kind,
        SignalKind::PaymentCompleted { payment_id: id, .. } if id == payment_id
    ));
    assert!(other_window.poll().unwrap().is_empty());
    assert_eq!(strip_payment_params(&url).as_str(), "https://shop.test/orders/7");
}

#[tokio::test]
async fn test_notifications_badge_and_read() {
    let backend = MockBackend::start().await;
    let (client, _storage) = buyer(&backend).await;
    let user = UserId::new(BUYER_ID);

    let notifications = client.list_notifications(user).await.unwrap();
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0].title, "Đặt cọc thành công");

    let unread = client.unread_notification_count(user).await;
    assert_eq!(unread.value, 1);
    assert!(!unread.is_degraded());

    client
        .mark_notification_read(NotificationId::new(1))
        .await
        .unwrap();
    assert_eq!(client.unread_notification_count(user).await.value, 0);
}

#[tokio::test]
async fn test_badge_degrades_when_signed_out() {
    let backend = MockBackend::start().await;
    let (client, _storage) = backend.client();

    let unread = client.unread_notification_count(UserId::new(BUYER_ID)).await;
    assert_eq!(unread.value, 0);
    assert!(unread.is_degraded());
}
