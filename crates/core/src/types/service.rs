//! Logical names of the deployed services.

use serde::{Deserialize, Serialize};

/// A service of the platform under test.
///
/// The harness addresses services by logical name and resolves the base URL
/// through its service registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceName {
    ApiGateway,
    ProxyClient,
    ServiceDiscovery,
    CloudConfig,
    UserService,
    ProductService,
    OrderService,
    PaymentService,
    FavouriteService,
    ShippingService,
}

/// Error returned when parsing an unknown service name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service '{0}'")]
pub struct UnknownServiceName(pub String);

impl ServiceName {
    /// Every known service, infrastructure first.
    pub const ALL: [Self; 10] = [
        Self::ApiGateway,
        Self::ProxyClient,
        Self::ServiceDiscovery,
        Self::CloudConfig,
        Self::UserService,
        Self::ProductService,
        Self::OrderService,
        Self::PaymentService,
        Self::FavouriteService,
        Self::ShippingService,
    ];

    /// The kebab-case name used in routes and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiGateway => "api-gateway",
            Self::ProxyClient => "proxy-client",
            Self::ServiceDiscovery => "service-discovery",
            Self::CloudConfig => "cloud-config",
            Self::UserService => "user-service",
            Self::ProductService => "product-service",
            Self::OrderService => "order-service",
            Self::PaymentService => "payment-service",
            Self::FavouriteService => "favourite-service",
            Self::ShippingService => "shipping-service",
        }
    }

    /// Prefix for per-service environment variables (`USER_SERVICE_URL`, ...).
    #[must_use]
    pub fn env_prefix(self) -> String {
        self.as_str().replace('-', "_").to_uppercase()
    }

    /// Infrastructure services expose only actuator endpoints.
    #[must_use]
    pub const fn is_infrastructure(self) -> bool {
        matches!(
            self,
            Self::ApiGateway | Self::ProxyClient | Self::ServiceDiscovery | Self::CloudConfig
        )
    }

    /// Endpoint probed to decide whether the service is reachable.
    #[must_use]
    pub const fn health_endpoint(self) -> &'static str {
        match self {
            Self::ApiGateway | Self::ProxyClient | Self::ServiceDiscovery | Self::CloudConfig => {
                "actuator/health"
            }
            Self::UserService => "api/users",
            Self::ProductService => "api/products",
            Self::OrderService => "api/orders",
            Self::PaymentService => "api/payments",
            Self::FavouriteService => "api/favourites",
            Self::ShippingService => "api/shippings",
        }
    }
}

impl std::fmt::Display for ServiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceName {
    type Err = UnknownServiceName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| UnknownServiceName(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name_round_trip() {
        for service in ServiceName::ALL {
            assert_eq!(service.as_str().parse::<ServiceName>().unwrap(), service);
        }
    }

    #[test]
    fn test_unknown_service_name() {
        let err = "inventory-service".parse::<ServiceName>().unwrap_err();
        assert_eq!(err.to_string(), "unknown service 'inventory-service'");
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ServiceName::UserService.env_prefix(), "USER_SERVICE");
        assert_eq!(ServiceName::ApiGateway.env_prefix(), "API_GATEWAY");
    }

    #[test]
    fn test_health_endpoints() {
        assert_eq!(ServiceName::CloudConfig.health_endpoint(), "actuator/health");
        assert_eq!(ServiceName::ShippingService.health_endpoint(), "api/shippings");
        assert!(ServiceName::ProxyClient.is_infrastructure());
        assert!(!ServiceName::OrderService.is_infrastructure());
    }
}
