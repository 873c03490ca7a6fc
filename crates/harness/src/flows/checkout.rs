//! Purchase flow: cart, order, payment and shipping.

use ecommerce_harness_core::{
    CartId, OrderId, PaymentId, PaymentStatus, ProductId, ResourceKey, ResourceKind, UserId,
};
use serde_json::{Value, json};
use tracing::{info, instrument};

use super::{FlowError, Steps, id_field};
use crate::client::ApiClient;
use crate::generators::DataGenerator;
use crate::payloads::{CheckoutRequest, NewShipping};
use crate::registry::CleanupRegistry;

/// Records produced by a complete checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutResult {
    pub cart: Value,
    pub order: Value,
    pub payment: Value,
    pub shipping: Value,
}

/// Purchase operations across order, payment and shipping services.
#[derive(Debug, Clone)]
pub struct CheckoutFlow<'a> {
    steps: Steps<'a>,
    generator: DataGenerator,
}

impl<'a> CheckoutFlow<'a> {
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            steps: Steps::new(client, None),
            generator: DataGenerator::from_config(client.config()),
        }
    }

    /// Track every created resource in `registry`.
    #[must_use]
    pub fn with_registry(mut self, registry: &'a CleanupRegistry) -> Self {
        self.steps.registry = Some(registry);
        self
    }

    /// Create a cart for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn create_cart(&self, user_id: UserId) -> Result<Value, FlowError> {
        self.steps
            .create("create_cart", ResourceKind::Cart, &self.generator.cart(user_id))
            .await
    }

    /// Update a cart with `changes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_cart(&self, cart: &Value, changes: Value) -> Result<Value, FlowError> {
        self.steps
            .update("update_cart", ResourceKind::Cart, cart, changes)
            .await
    }

    /// `PUT` `fields` on `api/carts/{cart_id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_cart_by_id(&self, cart_id: CartId, fields: &Value) -> Result<Value, FlowError> {
        self.steps
            .update_by_id("update_cart_by_id", ResourceKind::Cart, &cart_id.into(), fields)
            .await
    }

    /// Delete a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn delete_cart(&self, cart_id: CartId) -> Result<(), FlowError> {
        self.steps
            .delete("delete_cart", ResourceKind::Cart, &cart_id.into())
            .await
    }

    /// Create an order from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn create_order(&self, cart_id: CartId) -> Result<Value, FlowError> {
        self.steps
            .create("create_order", ResourceKind::Order, &self.generator.order(cart_id))
            .await
    }

    /// Update an order with `changes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_order(&self, order: &Value, changes: Value) -> Result<Value, FlowError> {
        self.steps
            .update("update_order", ResourceKind::Order, order, changes)
            .await
    }

    /// `PUT` `fields` on `api/orders/{order_id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_order_by_id(
        &self,
        order_id: OrderId,
        fields: &Value,
    ) -> Result<Value, FlowError> {
        self.steps
            .update_by_id("update_order_by_id", ResourceKind::Order, &order_id.into(), fields)
            .await
    }

    /// Delete an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<(), FlowError> {
        self.steps
            .delete("delete_order", ResourceKind::Order, &order_id.into())
            .await
    }

    /// Create an unpaid payment for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn process_payment(&self, order_id: OrderId) -> Result<Value, FlowError> {
        self.steps
            .create(
                "process_payment",
                ResourceKind::Payment,
                &self.generator.payment(order_id),
            )
            .await
    }

    /// Move a payment to `status`; `isPayed` follows the status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_payment_status(
        &self,
        payment: &Value,
        status: PaymentStatus,
    ) -> Result<Value, FlowError> {
        self.steps
            .update(
                "update_payment_status",
                ResourceKind::Payment,
                payment,
                json!({"paymentStatus": status, "isPayed": status.is_payed()}),
            )
            .await
    }

    /// Delete a payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn delete_payment(&self, payment_id: PaymentId) -> Result<(), FlowError> {
        self.steps
            .delete("delete_payment", ResourceKind::Payment, &payment_id.into())
            .await
    }

    /// Create the shipping line of an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn create_shipping(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Value, FlowError> {
        let shipping = NewShipping {
            order_id,
            product_id,
            ordered_quantity: quantity,
        };
        self.steps
            .create("create_shipping", ResourceKind::Shipping, &shipping)
            .await
    }

    /// Update a shipping line with `changes`, e.g. a new `orderedQuantity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    pub async fn update_shipping(&self, shipping: &Value, changes: Value) -> Result<Value, FlowError> {
        self.steps
            .update("update_shipping", ResourceKind::Shipping, shipping, changes)
            .await
    }

    /// Delete the shipping line of `product_id` in `order_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns non-2xx.
    #[instrument(skip(self))]
    pub async fn delete_shipping(
        &self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<(), FlowError> {
        let key = ResourceKey::Composite(vec![order_id.to_string(), product_id.to_string()]);
        self.steps
            .delete("delete_shipping", ResourceKind::Shipping, &key)
            .await
    }

    /// Run cart → order → payment → shipping.
    ///
    /// Stops at the first failing step; earlier resources stay in place (and
    /// tracked, if a registry is attached).
    ///
    /// # Errors
    ///
    /// Returns the first step's error.
    #[instrument(skip(self))]
    pub async fn complete_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutResult, FlowError> {
        info!(user_id = %request.user_id, product_id = %request.product_id, "Starting checkout");

        let cart = self.create_cart(request.user_id).await?;
        let cart_id: CartId = id_field("create_cart", &cart, "cartId")?;

        let order = self.create_order(cart_id).await?;
        let order_id: OrderId = id_field("create_order", &order, "orderId")?;

        let payment = self.process_payment(order_id).await?;
        let shipping = self
            .create_shipping(order_id, request.product_id, request.quantity)
            .await?;

        info!(%order_id, "Checkout completed");
        Ok(CheckoutResult {
            cart,
            order,
            payment,
            shipping,
        })
    }
}
