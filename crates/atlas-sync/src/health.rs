//! # Module Health Monitor
//!
//! Probes every module on the configured roster and aggregates the results
//! into a single system status for the gateway's health page.
//!
//! ## Aggregation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Health Aggregation                                  │
//! │                                                                         │
//! │  check_all()                                                            │
//! │      │                                                                  │
//! │      ├──► GET /health/manager     ──┐                                   │
//! │      ├──► GET /health/financial   ──┤  probed concurrently, each        │
//! │      ├──► GET /health/production  ──┤  bounded by the health timeout    │
//! │      └──► GET /health/cloud       ──┘  (default 5s)                     │
//! │                                                                         │
//! │  all online  → HEALTHY                                                  │
//! │  some online → DEGRADED                                                 │
//! │  none online → DOWN                                                     │
//! │                                                                         │
//! │  A failed probe never fails the sweep: the module is reported offline  │
//! │  and the failure is classified and logged through the shared taxonomy. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Instant;

use chrono::{DateTime, Utc};
use futures_util::future;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use atlas_core::ModuleId;

use crate::transport::{classify_now, signals_from_reqwest, signals_from_response, Transport};

// =============================================================================
// Health Types
// =============================================================================

/// Aggregate availability of the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemStatus {
    /// Every module answered its probe.
    Healthy,
    /// Some modules answered, some did not.
    Degraded,
    /// No module answered.
    Down,
}

/// Probe outcome for a single module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ModuleHealth {
    /// Module this probe addressed.
    #[serde(rename = "name")]
    pub module: ModuleId,

    /// Whether the module answered with a success status.
    pub online: bool,

    /// The probed URL, for operator diagnostics.
    pub url: String,

    /// Version the module reported, when its health payload carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Round-trip time of the probe in milliseconds. For offline modules
    /// this is the time until the failure was observed.
    pub response_time_ms: u64,

    /// When the probe ran.
    #[ts(as = "String")]
    pub last_check: DateTime<Utc>,
}

/// One sweep over the full roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    /// Aggregate status over all probed modules.
    pub status: SystemStatus,

    /// When the sweep ran.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    /// Per-module outcomes, in roster order.
    pub modules: Vec<ModuleHealth>,
}

/// Body a module health endpoint may return. Parsed best-effort; a module
/// that answers 2xx with any other body is still online.
#[derive(Debug, Default, Deserialize)]
struct HealthPayload {
    #[serde(default)]
    version: Option<String>,
}

fn aggregate(modules: &[ModuleHealth]) -> SystemStatus {
    let online = modules.iter().filter(|m| m.online).count();
    if online == modules.len() && online > 0 {
        SystemStatus::Healthy
    } else if online > 0 {
        SystemStatus::Degraded
    } else {
        SystemStatus::Down
    }
}

// =============================================================================
// Health Monitor
// =============================================================================

/// Probes module health endpoints and aggregates the results.
pub struct HealthMonitor {
    transport: Transport,
}

impl HealthMonitor {
    pub fn new(transport: Transport) -> Self {
        HealthMonitor { transport }
    }

    /// Probes every module on the configured roster concurrently.
    pub async fn check_all(&self) -> SystemHealth {
        let roster = self.transport.config.gateway.modules.clone();
        let probes = roster.into_iter().map(|module| self.check(module));
        let modules = future::join_all(probes).await;

        let status = aggregate(&modules);
        debug!(?status, probed = modules.len(), "Health sweep complete");

        SystemHealth {
            status,
            timestamp: Utc::now(),
            modules,
        }
    }

    /// Probes a single module's health endpoint.
    pub async fn check(&self, module: ModuleId) -> ModuleHealth {
        let url = self.transport.config.health_url(module);
        let started = Instant::now();

        let builder = self
            .transport
            .client
            .get(&url)
            .timeout(self.transport.config.health_timeout());
        let outcome = self.transport.authorize(builder).send().await;
        let response_time_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(response) if response.status().is_success() => {
                let version = response
                    .json::<HealthPayload>()
                    .await
                    .unwrap_or_default()
                    .version;
                debug!(%module, response_time_ms, "Module online");
                ModuleHealth {
                    module,
                    online: true,
                    url,
                    version,
                    response_time_ms,
                    last_check: Utc::now(),
                }
            }
            Ok(response) => {
                let error = classify_now(&signals_from_response(&response), module, "health");
                warn!(
                    %module,
                    category = %error.category,
                    code = %error.code,
                    "Module health probe rejected"
                );
                self.offline(module, url, response_time_ms)
            }
            Err(e) => {
                let error = classify_now(&signals_from_reqwest(&e), module, "health");
                warn!(
                    %module,
                    category = %error.category,
                    code = %error.code,
                    "Module health probe failed"
                );
                self.offline(module, url, response_time_ms)
            }
        }
    }

    fn offline(&self, module: ModuleId, url: String, response_time_ms: u64) -> ModuleHealth {
        ModuleHealth {
            module,
            online: false,
            url,
            version: None,
            response_time_ms,
            last_check: Utc::now(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{spawn_backend, transport_for};
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    fn probe(module: ModuleId, online: bool) -> ModuleHealth {
        ModuleHealth {
            module,
            online,
            url: format!("http://gateway.local/health/{}", module),
            version: None,
            response_time_ms: 12,
            last_check: Utc::now(),
        }
    }

    #[test]
    fn test_aggregate_statuses() {
        let all = [probe(ModuleId::Manager, true), probe(ModuleId::Cloud, true)];
        assert_eq!(aggregate(&all), SystemStatus::Healthy);

        let some = [probe(ModuleId::Manager, true), probe(ModuleId::Cloud, false)];
        assert_eq!(aggregate(&some), SystemStatus::Degraded);

        let none = [probe(ModuleId::Manager, false), probe(ModuleId::Cloud, false)];
        assert_eq!(aggregate(&none), SystemStatus::Down);
    }

    #[test]
    fn test_wire_shape_matches_gateway_contract() {
        let health = SystemHealth {
            status: SystemStatus::Degraded,
            timestamp: Utc::now(),
            modules: vec![probe(ModuleId::Financial, true)],
        };
        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["status"], "DEGRADED");
        assert_eq!(json["modules"][0]["name"], "financial");
        assert_eq!(json["modules"][0]["online"], true);
        assert_eq!(json["modules"][0]["responseTimeMs"], 12);
        assert!(json["modules"][0].get("lastCheck").is_some());
    }

    #[tokio::test]
    async fn test_all_modules_online_is_healthy() {
        async fn health_ok(Path(_module): Path<String>) -> impl IntoResponse {
            Json(json!({ "status": "ok", "version": "1.4.2" }))
        }
        let base = spawn_backend(Router::new().route("/health/{module}", get(health_ok))).await;
        let monitor = HealthMonitor::new(transport_for(&base));

        let health = monitor.check_all().await;

        assert_eq!(health.status, SystemStatus::Healthy);
        assert_eq!(health.modules.len(), ModuleId::ALL.len());
        assert!(health.modules.iter().all(|m| m.online));
        assert_eq!(health.modules[0].version.as_deref(), Some("1.4.2"));
    }

    #[tokio::test]
    async fn test_failing_module_degrades_the_system() {
        async fn health_mixed(Path(module): Path<String>) -> axum::response::Response {
            if module == "cloud" {
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            } else {
                Json(json!({ "status": "ok" })).into_response()
            }
        }
        let base = spawn_backend(Router::new().route("/health/{module}", get(health_mixed))).await;
        let monitor = HealthMonitor::new(transport_for(&base));

        let health = monitor.check_all().await;

        assert_eq!(health.status, SystemStatus::Degraded);
        let cloud = health
            .modules
            .iter()
            .find(|m| m.module == ModuleId::Cloud)
            .unwrap();
        assert!(!cloud.online);
        assert!(health
            .modules
            .iter()
            .filter(|m| m.module != ModuleId::Cloud)
            .all(|m| m.online));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_down() {
        let monitor = HealthMonitor::new(transport_for("http://127.0.0.1:1"));

        let health = monitor.check_all().await;

        assert_eq!(health.status, SystemStatus::Down);
        assert!(health.modules.iter().all(|m| !m.online));
    }

    #[tokio::test]
    async fn test_online_module_with_unparseable_body_stays_online() {
        async fn health_plain(Path(_module): Path<String>) -> impl IntoResponse {
            "OK"
        }
        let base = spawn_backend(Router::new().route("/health/{module}", get(health_plain))).await;
        let monitor = HealthMonitor::new(transport_for(&base));

        let health = monitor.check(ModuleId::Manager).await;
        assert!(health.online);
        assert_eq!(health.version, None);
    }
}
