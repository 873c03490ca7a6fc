//! Randomized request bodies.
//!
//! Every generated value that must be unique across runs (titles, emails,
//! usernames, SKUs) embeds [`DataGenerator::unique_id`], so parallel runs
//! against the same platform do not collide.

use chrono::{Duration, Local, NaiveDateTime, Timelike};
use ecommerce_harness_core::{
    CartId, CategoryId, CredentialId, LikeDate, OrderId, PaymentStatus, Price, ProductId,
    RoleBasedAuthority, UserId,
};
use rand::Rng;
use rand::seq::IndexedRandom;
use uuid::Uuid;

use crate::config::HarnessConfig;
use crate::payloads::{
    CartRef, CategoryRef, CredentialRef, NewAddress, NewCart, NewCategory, NewCredential,
    NewFavourite, NewOrder, NewPayment, NewProduct, NewShipping, NewUser, NewVerificationToken,
    OrderRef, UserRef,
};

const CITIES: &[&str] = &["Madrid", "Barcelona", "Valencia", "Sevilla", "Bilbao"];
const FIRST_NAMES: &[&str] = &["Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald"];
const LAST_NAMES: &[&str] = &["Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth"];
const CATEGORY_NAMES: &[&str] = &["Electronics", "Books", "Clothing", "Garden", "Toys"];
const PRODUCT_NAMES: &[&str] = &["Phone", "Laptop", "Headphones", "Camera", "Watch"];

/// Password given to generated credentials.
pub const TEST_PASSWORD: &str = "Test@1234";

/// Builds payloads with a common identifier prefix.
#[derive(Debug, Clone)]
pub struct DataGenerator {
    prefix: String,
}

impl Default for DataGenerator {
    fn default() -> Self {
        Self::new("e2e_")
    }
}

fn pick(options: &'static [&'static str]) -> &'static str {
    options.choose(&mut rand::rng()).copied().unwrap_or_default()
}

impl DataGenerator {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Generator using the configured `TEST_DATA_PREFIX`.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config.test_data_prefix.clone())
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `prefix` followed by 8 random hex characters.
    #[must_use]
    pub fn unique_id(&self) -> String {
        let hex = Uuid::new_v4().simple().to_string();
        format!("{}{}", self.prefix, hex.get(..8).unwrap_or(&hex))
    }

    #[must_use]
    pub fn user(&self) -> NewUser {
        let id = self.unique_id();
        let mut rng = rand::rng();
        NewUser {
            first_name: pick(FIRST_NAMES).to_string(),
            last_name: pick(LAST_NAMES).to_string(),
            email: format!("{id}@example.com"),
            phone: format!("+34{:09}", rng.random_range(600_000_000..700_000_000_u32)),
            image_url: format!("https://example.com/avatars/{id}.png"),
        }
    }

    #[must_use]
    pub fn address(&self, user_id: UserId) -> NewAddress {
        let mut rng = rand::rng();
        NewAddress {
            full_address: format!("Calle Prueba {}", rng.random_range(1..=1000)),
            postal_code: rng.random_range(10_000..=99_999).to_string(),
            city: pick(CITIES).to_string(),
            user_dto: UserRef { user_id },
        }
    }

    #[must_use]
    pub fn credential(&self, user_id: UserId) -> NewCredential {
        NewCredential {
            username: self.unique_id(),
            password: TEST_PASSWORD.to_string(),
            role_based_authority: RoleBasedAuthority::User,
            is_enabled: true,
            is_account_non_expired: true,
            is_account_non_locked: true,
            is_credentials_non_expired: true,
            user_dto: UserRef { user_id },
        }
    }

    /// Token expiring in one to thirty days.
    #[must_use]
    pub fn verification_token(&self, credential_id: CredentialId) -> NewVerificationToken {
        let days = rand::rng().random_range(1..=30);
        let expires = Local::now().date_naive() + Duration::days(days);
        NewVerificationToken {
            token: Uuid::new_v4().to_string(),
            expire_date: expires.format("%d-%m-%Y").to_string(),
            credential_dto: CredentialRef { credential_id },
        }
    }

    #[must_use]
    pub fn category(&self) -> NewCategory {
        let id = self.unique_id();
        NewCategory {
            category_title: format!("{}_{id}", pick(CATEGORY_NAMES)),
            image_url: format!("https://example.com/categories/{id}.jpg"),
        }
    }

    #[must_use]
    pub fn product(&self, category_id: CategoryId) -> NewProduct {
        let id = self.unique_id();
        let mut rng = rand::rng();
        NewProduct {
            product_title: format!("{}_{id}", pick(PRODUCT_NAMES)),
            image_url: format!("https://example.com/products/{id}.jpg"),
            sku: format!("SKU-{}", id.to_uppercase()),
            price_unit: Price::from_cents(rng.random_range(1_000..=100_000)),
            quantity: rng.random_range(1..=100),
            category_dto: CategoryRef { category_id },
        }
    }

    #[must_use]
    pub const fn cart(&self, user_id: UserId) -> NewCart {
        NewCart { user_id }
    }

    #[must_use]
    pub fn order(&self, cart_id: CartId) -> NewOrder {
        NewOrder {
            order_desc: format!("Order {}", self.unique_id()),
            order_fee: Price::from_cents(rand::rng().random_range(5_000..=50_000)),
            cart_dto: CartRef { cart_id },
        }
    }

    /// Unpaid payment in `NOT_STARTED`.
    #[must_use]
    pub const fn payment(&self, order_id: OrderId) -> NewPayment {
        NewPayment {
            is_payed: false,
            payment_status: PaymentStatus::NotStarted,
            order: OrderRef { order_id },
        }
    }

    #[must_use]
    pub fn shipping(&self, order_id: OrderId, product_id: ProductId) -> NewShipping {
        NewShipping {
            order_id,
            product_id,
            ordered_quantity: rand::rng().random_range(1..=10),
        }
    }

    /// Favourite liked now, at microsecond precision.
    #[must_use]
    pub fn favourite(&self, user_id: UserId, product_id: ProductId) -> NewFavourite {
        NewFavourite {
            user_id,
            product_id,
            like_date: like_date_now(),
        }
    }
}

/// Current local time truncated to the microsecond precision of `likeDate`.
#[must_use]
pub fn like_date_now() -> LikeDate {
    LikeDate::from_datetime(truncate_to_micros(Local::now().naive_local()))
}

/// Truncate a timestamp to microseconds.
#[must_use]
pub fn truncate_to_micros(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_nanosecond(value.nanosecond() / 1_000 * 1_000)
        .unwrap_or(value)
}
