//! Favourite composite key.
//!
//! favourite-service identifies a favourite by `userId`, `productId` and the
//! `likeDate` timestamp, rendered as `dd-MM-yyyy__HH:mm:ss:SSSSSS`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{ProductId, ResourceKey, UserId};

/// Errors that can occur when parsing a [`LikeDate`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum LikeDateError {
    /// The input does not match `dd-MM-yyyy__HH:mm:ss:SSSSSS`.
    #[error("like date must match dd-MM-yyyy__HH:mm:ss:SSSSSS: {0}")]
    Format(String),
}

/// Timestamp of a favourite, in the service's wire format.
///
/// ## Examples
///
/// ```
/// use ecommerce_harness_core::LikeDate;
///
/// let date = LikeDate::parse("10-06-2025__14:30:00:000000").unwrap();
/// assert_eq!(date.to_string(), "10-06-2025__14:30:00:000000");
///
/// assert!(LikeDate::parse("2025-06-10T14:30:00Z").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LikeDate(NaiveDateTime);

impl LikeDate {
    /// `chrono` format string for the wire representation.
    pub const FORMAT: &'static str = "%d-%m-%Y__%H:%M:%S:%6f";

    /// Parse a `LikeDate` from its wire representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not match the wire format.
    pub fn parse(s: &str) -> Result<Self, LikeDateError> {
        // %6f after ':' is not accepted by chrono's parser, so split it off.
        let (head, micros) = s
            .rsplit_once(':')
            .ok_or_else(|| LikeDateError::Format(s.to_string()))?;
        if micros.len() != 6 || !micros.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LikeDateError::Format(s.to_string()));
        }
        let base = NaiveDateTime::parse_from_str(head, "%d-%m-%Y__%H:%M:%S")
            .map_err(|_| LikeDateError::Format(s.to_string()))?;
        let micros: i64 = micros
            .parse()
            .map_err(|_| LikeDateError::Format(s.to_string()))?;
        Ok(Self(base + chrono::Duration::microseconds(micros)))
    }

    /// Wrap an existing timestamp.
    #[must_use]
    pub const fn from_datetime(value: NaiveDateTime) -> Self {
        Self(value)
    }

    /// The underlying timestamp.
    #[must_use]
    pub const fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }
}

impl std::fmt::Display for LikeDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl Serialize for LikeDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LikeDate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Composite key of a favourite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteKey {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub like_date: LikeDate,
}

impl FavouriteKey {
    /// Path of this favourite under `api/favourites`.
    #[must_use]
    pub fn path(&self) -> String {
        format!(
            "api/favourites/{}/{}/{}",
            self.user_id, self.product_id, self.like_date
        )
    }
}

impl From<FavouriteKey> for ResourceKey {
    fn from(key: FavouriteKey) -> Self {
        Self::Composite(vec![
            key.user_id.to_string(),
            key.product_id.to_string(),
            key.like_date.to_string(),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_like_date_round_trip() {
        let raw = "11-06-2025__15:30:00:000123";
        assert_eq!(LikeDate::parse(raw).unwrap().to_string(), raw);
    }

    #[test]
    fn test_like_date_rejects_iso() {
        assert!(LikeDate::parse("2025-05-30T12:00:00Z").is_err());
        assert!(LikeDate::parse("10-06-2025__14:30:00:123").is_err());
    }

    #[test]
    fn test_favourite_key_path_and_resource_key() {
        let key = FavouriteKey {
            user_id: UserId::new(1),
            product_id: ProductId::new(2),
            like_date: LikeDate::parse("10-06-2025__14:30:00:000000").unwrap(),
        };
        assert_eq!(key.path(), "api/favourites/1/2/10-06-2025__14:30:00:000000");
        assert_eq!(
            ResourceKey::from(key).to_string(),
            "1/2/10-06-2025__14:30:00:000000"
        );
    }

    #[test]
    fn test_favourite_key_serializes_camel_case() {
        let key = FavouriteKey {
            user_id: UserId::new(3),
            product_id: ProductId::new(4),
            like_date: LikeDate::parse("13-06-2025__09:00:00:000000").unwrap(),
        };
        assert_eq!(
            serde_json::to_value(key).unwrap(),
            serde_json::json!({
                "userId": 3,
                "productId": 4,
                "likeDate": "13-06-2025__09:00:00:000000"
            })
        );
    }
}
