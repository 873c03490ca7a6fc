//! Resource kinds and the keys used to address created resources.
//!
//! Every resource a test creates is recorded as a ([`ResourceKind`],
//! [`ResourceKey`]) pair so it can be deleted later through the owning
//! service's collection endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ServiceName;

/// Kind of resource exposed by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    VerificationToken,
    Credential,
    Address,
    Favourite,
    Shipping,
    Payment,
    Order,
    Cart,
    Product,
    Category,
    User,
}

impl ResourceKind {
    /// Deletion order: dependents before the resources they reference.
    pub const CLEANUP_ORDER: [Self; 11] = [
        Self::VerificationToken,
        Self::Credential,
        Self::Address,
        Self::Favourite,
        Self::Shipping,
        Self::Payment,
        Self::Order,
        Self::Cart,
        Self::Product,
        Self::Category,
        Self::User,
    ];

    /// Service that owns resources of this kind.
    #[must_use]
    pub const fn service(self) -> ServiceName {
        match self {
            Self::User | Self::Address | Self::Credential | Self::VerificationToken => {
                ServiceName::UserService
            }
            Self::Product | Self::Category => ServiceName::ProductService,
            Self::Order | Self::Cart => ServiceName::OrderService,
            Self::Payment => ServiceName::PaymentService,
            Self::Favourite => ServiceName::FavouriteService,
            Self::Shipping => ServiceName::ShippingService,
        }
    }

    /// Collection endpoint, relative to the owning service.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::VerificationToken => "api/verificationTokens",
            Self::Credential => "api/credentials",
            Self::Address => "api/address",
            Self::Favourite => "api/favourites",
            Self::Shipping => "api/shippings",
            Self::Payment => "api/payments",
            Self::Order => "api/orders",
            Self::Cart => "api/carts",
            Self::Product => "api/products",
            Self::Category => "api/categories",
            Self::User => "api/users",
        }
    }

    /// Record fields that together identify a resource, in path order.
    #[must_use]
    pub const fn key_fields(self) -> &'static [&'static str] {
        match self {
            Self::VerificationToken => &["verificationTokenId"],
            Self::Credential => &["credentialId"],
            Self::Address => &["addressId"],
            Self::Favourite => &["userId", "productId", "likeDate"],
            Self::Shipping => &["orderId", "productId"],
            Self::Payment => &["paymentId"],
            Self::Order => &["orderId"],
            Self::Cart => &["cartId"],
            Self::Product => &["productId"],
            Self::Category => &["categoryId"],
            Self::User => &["userId"],
        }
    }

    /// Plural name, as used on the command line and in logs.
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::VerificationToken => "verification_tokens",
            Self::Credential => "credentials",
            Self::Address => "addresses",
            Self::Favourite => "favourites",
            Self::Shipping => "shippings",
            Self::Payment => "payments",
            Self::Order => "orders",
            Self::Cart => "carts",
            Self::Product => "products",
            Self::Category => "categories",
            Self::User => "users",
        }
    }

    /// Extract the key of a record returned by the owning service.
    ///
    /// Returns `None` when any key field is missing or is not a scalar.
    #[must_use]
    pub fn key_from_record(self, record: &Value) -> Option<ResourceKey> {
        let fields = self.key_fields();
        if let [field] = fields {
            return record.get(*field).and_then(Value::as_i64).map(ResourceKey::Id);
        }

        fields
            .iter()
            .map(|field| match record.get(*field)? {
                Value::Number(n) => Some(n.to_string()),
                Value::String(s) => Some(s.clone()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(ResourceKey::Composite)
    }

    /// Path of a single resource, relative to the owning service.
    #[must_use]
    pub fn item_path(self, key: &ResourceKey) -> String {
        format!("{}/{key}", self.endpoint())
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.plural())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::CLEANUP_ORDER
            .into_iter()
            .find(|kind| kind.plural() == s)
            .ok_or_else(|| format!("invalid resource kind: {s}"))
    }
}

/// Identifier of a created resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceKey {
    /// Numeric primary key.
    Id(i64),
    /// Composite key, one path segment per component.
    Composite(Vec<String>),
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Composite(parts) => f.write_str(&parts.join("/")),
        }
    }
}

impl From<i64> for ResourceKey {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cleanup_order_covers_every_kind_once() {
        let mut kinds = ResourceKind::CLEANUP_ORDER.to_vec();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), ResourceKind::CLEANUP_ORDER.len());
        assert_eq!(ResourceKind::CLEANUP_ORDER.first(), Some(&ResourceKind::VerificationToken));
        assert_eq!(ResourceKind::CLEANUP_ORDER.last(), Some(&ResourceKind::User));
    }

    #[test]
    fn test_key_from_simple_record() {
        let record = json!({"categoryId": 12, "categoryTitle": "Electronics_x"});
        assert_eq!(
            ResourceKind::Category.key_from_record(&record),
            Some(ResourceKey::Id(12))
        );
        assert_eq!(ResourceKind::Product.key_from_record(&record), None);
    }

    #[test]
    fn test_key_from_composite_record() {
        let record = json!({
            "userId": 1,
            "productId": 2,
            "likeDate": "10-06-2025__14:30:00:000000"
        });
        let key = ResourceKind::Favourite.key_from_record(&record).unwrap();
        assert_eq!(
            ResourceKind::Favourite.item_path(&key),
            "api/favourites/1/2/10-06-2025__14:30:00:000000"
        );
    }

    #[test]
    fn test_shipping_key_is_order_then_product() {
        let record = json!({"productId": 5, "orderId": 3, "orderedQuantity": 25});
        let key = ResourceKind::Shipping.key_from_record(&record).unwrap();
        assert_eq!(key.to_string(), "3/5");
    }

    #[test]
    fn test_kind_parses_from_plural() {
        assert_eq!(
            "verification_tokens".parse::<ResourceKind>().unwrap(),
            ResourceKind::VerificationToken
        );
        assert!("widgets".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_owning_services() {
        assert_eq!(ResourceKind::Address.service(), ServiceName::UserService);
        assert_eq!(ResourceKind::Cart.service(), ServiceName::OrderService);
        assert_eq!(ResourceKind::Favourite.service(), ServiceName::FavouriteService);
    }
}
