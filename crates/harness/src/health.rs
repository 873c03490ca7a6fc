//! Service connectivity checks.
//!
//! Infrastructure services are probed on `actuator/health`; a 404 still
//! proves the service is up. Business services are probed on their
//! collection endpoint without credentials, where 401 and 403 also count as
//! reachable.

use std::time::Duration;

use ecommerce_harness_core::ServiceName;
use reqwest::{Method, StatusCode};
use tracing::{info, instrument, warn};

use crate::client::{ApiClient, ApiRequest};

/// Outcome of [`wait_for_services`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub available: Vec<ServiceName>,
    pub unavailable: Vec<ServiceName>,
}

impl ConnectivityReport {
    #[must_use]
    pub fn all_available(&self) -> bool {
        self.unavailable.is_empty()
    }
}

fn is_healthy_status(service: ServiceName, status: StatusCode) -> bool {
    if service.is_infrastructure() {
        matches!(status, StatusCode::OK | StatusCode::NOT_FOUND)
    } else {
        matches!(
            status,
            StatusCode::OK | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        )
    }
}

/// Probe one service once. Transport errors count as unhealthy.
#[instrument(skip(client))]
pub async fn check_service_health(client: &ApiClient, service: ServiceName) -> bool {
    let request = ApiRequest::new(Method::GET, service, service.health_endpoint()).anonymous();
    match client.request(request).await {
        Ok(response) => {
            let healthy = is_healthy_status(service, response.status());
            if !healthy {
                warn!(%service, status = %response.status(), "Service unhealthy");
            }
            healthy
        }
        Err(e) => {
            warn!(%service, error = %e, "Service unreachable");
            false
        }
    }
}

/// Probe each service until it is healthy or `max_attempts` probes failed.
///
/// Services are checked one after another; the delay is slept between
/// failed probes of the same service.
#[instrument(skip(client, services))]
pub async fn wait_for_services(
    client: &ApiClient,
    services: &[ServiceName],
    max_attempts: u32,
    delay: Duration,
) -> ConnectivityReport {
    let mut report = ConnectivityReport::default();
    let max_attempts = max_attempts.max(1);

    for &service in services {
        let mut healthy = false;
        for attempt in 1..=max_attempts {
            if check_service_health(client, service).await {
                healthy = true;
                break;
            }
            info!(%service, attempt, max_attempts, "Service not available yet");
            if attempt < max_attempts {
                tokio::time::sleep(delay).await;
            }
        }

        if healthy {
            info!(%service, "Service available");
            report.available.push(service);
        } else {
            warn!(%service, max_attempts, "Service unavailable");
            report.unavailable.push(service);
        }
    }

    info!(
        available = report.available.len(),
        unavailable = report.unavailable.len(),
        total = services.len(),
        "Connectivity summary"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infrastructure_accepts_not_found() {
        assert!(is_healthy_status(ServiceName::ApiGateway, StatusCode::NOT_FOUND));
        assert!(!is_healthy_status(ServiceName::ApiGateway, StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_business_accepts_auth_errors() {
        for status in [StatusCode::OK, StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            assert!(is_healthy_status(ServiceName::OrderService, status));
        }
        assert!(!is_healthy_status(ServiceName::OrderService, StatusCode::NOT_FOUND));
        assert!(!is_healthy_status(
            ServiceName::OrderService,
            StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[test]
    fn test_report_all_available() {
        let mut report = ConnectivityReport::default();
        assert!(report.all_available());
        report.unavailable.push(ServiceName::CloudConfig);
        assert!(!report.all_available());
    }
}
