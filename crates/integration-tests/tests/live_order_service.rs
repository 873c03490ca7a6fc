//! Live suite for order-service: carts and orders.
//!
//! These tests require a deployed platform.
//!
//! Run with: cargo test -p ecommerce-harness-integration-tests -- --ignored

use ecommerce_harness::assertions::{assert_collection_contains, assert_status};
use ecommerce_harness::flows::CheckoutFlow;
use ecommerce_harness_core::{CartId, OrderId, ResourceKey, ResourceKind, ServiceName, UserId};
use ecommerce_harness_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::{Value, json};

fn id<T: From<i32>>(record: &Value, field: &str) -> T {
    record[field]
        .as_i64()
        .and_then(|id| i32::try_from(id).ok())
        .map(T::from)
        .unwrap_or_else(|| panic!("missing {field} in {record}"))
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_cart_find_all() {
    let ctx = TestContext::from_env().expect("config");

    let response = ctx
        .client
        .get(ServiceName::OrderService, "api/carts")
        .await
        .expect("request");

    assert_status(&response, StatusCode::OK).expect("status");
    assert!(response.record().expect("json")["collection"].is_array());
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_cart_create_update_delete() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let flow = CheckoutFlow::new(&ctx.client).with_registry(&ctx.registry);

            let cart = flow.create_cart(UserId::new(1)).await.expect("cart");
            assert_eq!(cart["userId"], 1);

            let updated = flow
                .update_cart(&cart, json!({"userId": 2}))
                .await
                .expect("update");
            assert_eq!(updated["userId"], 2);
            assert_eq!(updated["cartId"], cart["cartId"]);

            let cart_id: CartId = id(&cart, "cartId");
            let by_id = flow
                .update_cart_by_id(cart_id, &json!({"userId": 1}))
                .await
                .expect("update by id");
            assert_eq!(by_id["userId"], 1);

            flow.delete_cart(cart_id).await.expect("delete");
            assert!(
                ctx.client
                    .find(ResourceKind::Cart, &cart_id.into())
                    .await
                    .expect("request")
                    .is_none()
            );
            assert!(ctx.registry.is_empty());
        })
        .await;
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_order_references_cart() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let flow = CheckoutFlow::new(&ctx.client).with_registry(&ctx.registry);

            let cart = flow.create_cart(UserId::new(1)).await.expect("cart");
            let cart_id: CartId = id(&cart, "cartId");
            let order = flow.create_order(cart_id).await.expect("order");

            let orders = ctx
                .client
                .get(ServiceName::OrderService, "api/orders")
                .await
                .expect("request")
                .record()
                .expect("json");
            assert_collection_contains(&orders, "orderId", order["orderId"].clone()).expect("listed");

            let key = ResourceKind::Order.key_from_record(&order).expect("key");
            let fetched = ctx
                .client
                .find(ResourceKind::Order, &key)
                .await
                .expect("request")
                .expect("order exists");
            assert_eq!(fetched["orderDesc"], order["orderDesc"]);
        })
        .await;
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_order_update_and_delete() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let flow = CheckoutFlow::new(&ctx.client).with_registry(&ctx.registry);

            let cart = flow.create_cart(UserId::new(1)).await.expect("cart");
            let order = flow.create_order(id(&cart, "cartId")).await.expect("order");
            let order_id: OrderId = id(&order, "orderId");

            let updated = flow
                .update_order(&order, json!({"orderDesc": "Updated order description"}))
                .await
                .expect("update");
            assert_eq!(updated["orderDesc"], "Updated order description");
            assert_eq!(updated["orderFee"], order["orderFee"]);

            let by_id = flow
                .update_order_by_id(
                    order_id,
                    &json!({
                        "orderDate": order["orderDate"],
                        "orderDesc": "Updated by id",
                        "orderFee": order["orderFee"],
                        "cartDto": {"cartId": cart["cartId"]},
                    }),
                )
                .await
                .expect("update by id");
            assert_eq!(by_id["orderDesc"], "Updated by id");

            flow.delete_order(order_id).await.expect("delete");
            assert!(
                ctx.client
                    .find(ResourceKind::Order, &order_id.into())
                    .await
                    .expect("request")
                    .is_none()
            );
        })
        .await;
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_missing_order_is_not_found() {
    let ctx = TestContext::from_env().expect("config");

    let found = ctx
        .client
        .find(ResourceKind::Order, &ResourceKey::Id(999_999_999))
        .await
        .expect("request");

    assert!(found.is_none());
}
