//! Request bodies in the services' wire shapes.
//!
//! Field names are camelCase as the services expect. Nested references
//! (`userDto`, `categoryDto`, ...) carry only the referenced identifier.

use ecommerce_harness_core::{
    CartId, CategoryId, CredentialId, LikeDate, OrderId, PaymentStatus, Price, ProductId,
    RoleBasedAuthority, UserId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRef {
    pub credential_id: CredentialId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub category_id: CategoryId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRef {
    pub cart_id: CartId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRef {
    pub order_id: OrderId,
}

/// user-service `api/users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub image_url: String,
}

/// user-service `api/address`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub full_address: String,
    pub postal_code: String,
    pub city: String,
    pub user_dto: UserRef,
}

/// user-service `api/credentials`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCredential {
    pub username: String,
    pub password: String,
    pub role_based_authority: RoleBasedAuthority,
    pub is_enabled: bool,
    pub is_account_non_expired: bool,
    pub is_account_non_locked: bool,
    pub is_credentials_non_expired: bool,
    pub user_dto: UserRef,
}

/// user-service `api/verificationTokens`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVerificationToken {
    pub token: String,
    /// `dd-MM-yyyy`
    pub expire_date: String,
    pub credential_dto: CredentialRef,
}

/// product-service `api/categories`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub category_title: String,
    pub image_url: String,
}

/// product-service `api/products`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub product_title: String,
    pub image_url: String,
    pub sku: String,
    pub price_unit: Price,
    pub quantity: u32,
    pub category_dto: CategoryRef,
}

/// order-service `api/carts`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCart {
    pub user_id: UserId,
}

/// order-service `api/orders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub order_desc: String,
    pub order_fee: Price,
    pub cart_dto: CartRef,
}

/// payment-service `api/payments`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub is_payed: bool,
    pub payment_status: PaymentStatus,
    pub order: OrderRef,
}

/// shipping-service `api/shippings`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShipping {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub ordered_quantity: u32,
}

/// favourite-service `api/favourites`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFavourite {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub like_date: LikeDate,
}

/// Input of a complete checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
}
