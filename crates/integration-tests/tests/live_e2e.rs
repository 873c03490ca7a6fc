//! End-to-end scenarios across services.
//!
//! These tests require a deployed platform.
//!
//! Run with: cargo test -p ecommerce-harness-integration-tests -- --ignored

use ecommerce_harness::assertions::{Poller, assert_contains_keys};
use ecommerce_harness::fixtures::{test_category, test_product, test_products, with_fixture};
use ecommerce_harness::flows::{CatalogFlow, CheckoutFlow, UserFlow};
use ecommerce_harness::payloads::CheckoutRequest;
use ecommerce_harness_core::{CategoryId, OrderId, PaymentStatus, ProductId, UserId};
use ecommerce_harness_integration_tests::TestContext;
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
async fn test_complete_purchase() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let users = UserFlow::new(&ctx.client).with_registry(&ctx.registry);
            let catalog = CatalogFlow::new(&ctx.client).with_registry(&ctx.registry);
            let checkout = CheckoutFlow::new(&ctx.client).with_registry(&ctx.registry);

            let setup = users
                .complete_user_setup(None, None, true)
                .await
                .expect("user setup");
            let user_id: UserId = id(&setup.user, "userId");

            let category = catalog.create_category(None).await.expect("category");
            let category_id: CategoryId = id(&category, "categoryId");
            let product = catalog
                .create_product(category_id, None)
                .await
                .expect("product");
            let product_id: ProductId = id(&product, "productId");

            catalog
                .add_favourite(user_id, product_id)
                .await
                .expect("favourite");

            let result = checkout
                .complete_checkout(CheckoutRequest {
                    user_id,
                    product_id,
                    quantity: 2,
                })
                .await
                .expect("checkout");
            assert_contains_keys(&result.order, &["orderId", "orderDesc", "orderFee"])
                .expect("order");
            assert_eq!(result.shipping["orderedQuantity"], 2);

            let paid = checkout
                .update_payment_status(&result.payment, PaymentStatus::Completed)
                .await
                .expect("pay");
            assert_eq!(paid["isPayed"], true);

            let order_id: OrderId = id(&result.order, "orderId");
            let payment = Poller::for_client(&ctx.client)
                .wait_for_order_status(&ctx.client, order_id, PaymentStatus::Completed)
                .await
                .expect("payment completed");
            assert_eq!(payment["paymentId"], result.payment["paymentId"]);

            let report = ctx.finish().await;
            assert!(report.failed.is_empty(), "cleanup failures: {:?}", report.failed);
        })
        .await;
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_user_lifecycle() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let flow = UserFlow::new(&ctx.client).with_registry(&ctx.registry);

            let setup = flow
                .complete_user_setup(None, None, true)
                .await
                .expect("setup");
            let updated = flow
                .update_user(&setup.user, json!({"phone": "+34600000000"}))
                .await
                .expect("update");
            assert_eq!(updated["phone"], "+34600000000");

            let report = ctx.finish().await;
            assert!(report.failed.is_empty(), "cleanup failures: {:?}", report.failed);
        })
        .await;
}

#[tokio::test]
#[ignore = "Requires deployed e-commerce platform"]
async fn test_inventory_management() {
    TestContext::from_env()
        .expect("config")
        .run(|ctx| async move {
            let category = test_category(&ctx.client).await.expect("category");
            let category_id: CategoryId = id(category.record(), "categoryId");

            let products = test_products(&ctx.client, category_id, 3)
                .await
                .expect("products");
            for product in &products {
                ctx.registry.track(product.kind(), product.key().clone());
            }
            let listed = CatalogFlow::new(&ctx.client)
                .products_in_category(category_id)
                .await
                .expect("list");
            assert_eq!(listed.len(), products.len());

            let product = test_product(&ctx.client, category_id).await.expect("product");
            let client = ctx.client.clone();
            let restocked = with_fixture(&ctx.client, product, |record| async move {
                CatalogFlow::new(&client)
                    .update_product(&record, json!({"quantity": 500}))
                    .await
            })
            .await
            .expect("restock");
            assert_eq!(restocked["quantity"], 500);
        })
        .await;
}
