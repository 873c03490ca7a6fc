//! Status enums echoed by the platform services.

use serde::{Deserialize, Serialize};

/// Payment lifecycle status (payment-service).
///
/// The service accepts any transition; the harness only probes the
/// `NOT_STARTED -> IN_PROGRESS -> COMPLETED` path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl PaymentStatus {
    /// Wire representation, as found in `paymentStatus`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    /// Whether a payment in this status counts as paid (`isPayed`).
    #[must_use]
    pub const fn is_payed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role granted to a credential (user-service).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RoleBasedAuthority {
    #[default]
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl std::fmt::Display for RoleBasedAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "ROLE_USER"),
            Self::Admin => write!(f, "ROLE_ADMIN"),
        }
    }
}

impl std::str::FromStr for RoleBasedAuthority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(Self::User),
            "ROLE_ADMIN" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}
