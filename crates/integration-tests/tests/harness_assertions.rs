//! Polling assertions against a mock gateway.

use std::time::Duration;

use ecommerce_harness::assertions::{AssertionFailure, Poller};
use ecommerce_harness_core::{OrderId, PaymentStatus, ResourceKey, ResourceKind};
use ecommerce_harness_integration_tests::{TestContext, mount_auth};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_poller() -> Poller {
    Poller::new(Duration::from_secs(2), Duration::from_millis(20))
}

#[tokio::test]
async fn test_wait_for_order_status_polls_until_reached() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    let other_order = json!({
        "paymentId": 31,
        "paymentStatus": "COMPLETED",
        "isPayed": true,
        "order": {"orderId": 21},
    });
    Mock::given(method("GET"))
        .and(path("/payment-service/api/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"collection": [
            other_order.clone(),
            {"paymentId": 30, "paymentStatus": "IN_PROGRESS", "order": {"orderId": 20}},
        ]})))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/payment-service/api/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"collection": [
            other_order,
            {"paymentId": 30, "paymentStatus": "COMPLETED", "isPayed": true, "order": {"orderId": 20}},
        ]})))
        .mount(&server)
        .await;
    let ctx = TestContext::mocked(&server.uri()).expect("client");

    let payment = fast_poller()
        .wait_for_order_status(&ctx.client, OrderId::new(20), PaymentStatus::Completed)
        .await
        .expect("status reached");

    assert_eq!(payment["paymentId"], 30);
    assert_eq!(payment["isPayed"], true);
}

#[tokio::test]
async fn test_wait_for_order_status_without_payment_times_out() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/payment-service/api/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"collection": []})))
        .mount(&server)
        .await;
    let ctx = TestContext::mocked(&server.uri()).expect("client");

    let err = Poller::new(Duration::from_millis(100), Duration::from_millis(20))
        .wait_for_order_status(&ctx.client, OrderId::new(20), PaymentStatus::Completed)
        .await
        .expect_err("no payment for the order");

    assert!(matches!(err, AssertionFailure::Timeout { .. }));
    assert!(err.to_string().contains("order 20"));
}

#[tokio::test]
async fn test_wait_for_entity_times_out() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/order-service/api/carts/5"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let ctx = TestContext::mocked(&server.uri()).expect("client");

    let err = Poller::new(Duration::from_millis(100), Duration::from_millis(20))
        .wait_for_entity(&ctx.client, ResourceKind::Cart, &ResourceKey::Id(5))
        .await
        .expect_err("never appears");

    assert!(matches!(err, AssertionFailure::Timeout { .. }));
}

#[tokio::test]
async fn test_wait_for_deletion_succeeds_once_gone() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/product-service/api/categories/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"categoryId": 2})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/product-service/api/categories/2"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Category not found"))
        .mount(&server)
        .await;
    let ctx = TestContext::mocked(&server.uri()).expect("client");

    fast_poller()
        .wait_for_deletion(&ctx.client, ResourceKind::Category, &ResourceKey::Id(2))
        .await
        .expect("deleted");
}
