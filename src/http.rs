//! HTTP API — the network-facing producers.
//!
//! Every endpoint is a thin handler that signals the dispatcher, feeds
//! the WoL encoder, or drives the SSH client; none of them touch the
//! HID transport directly. Queued commands report `*_sent: true`
//! immediately; there is no feedback channel from the dispatcher, so
//! "sent" means "requested", not "delivered".

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::SshConfig;
use crate::dispatcher::{AppTarget, Dispatcher, HostCommand};
use crate::ssh;
use crate::wol::{self, MacAddr};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub ssh: Arc<SshConfig>,
}

/// Build the router with all routes and layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/wakeup", get(wakeup))
        .route("/wol", get(send_wol))
        .route("/restart", get(pc_restart))
        .route("/shutdown", get(pc_shutdown))
        .route("/restart-app", get(restart_app))
        .route("/ssh/shutdown", get(ssh_shutdown))
        .route("/ssh/restart", get(ssh_restart))
        .route("/ssh/test", get(ssh_test))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

const INDEX_HTML: &str = include_str!("web/index.html");

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Serialize)]
struct KeypressResponse {
    keypress_sent: bool,
}

async fn wakeup(State(state): State<AppState>) -> Json<KeypressResponse> {
    info!("received wake request, sending keypress");
    state.dispatcher.request(HostCommand::Keypress);
    Json(KeypressResponse {
        keypress_sent: true,
    })
}

#[derive(Debug, Serialize)]
struct PcRestartResponse {
    pc_restart_sent: bool,
}

async fn pc_restart(State(state): State<AppState>) -> Json<PcRestartResponse> {
    info!("received PC restart request, sending restart signal");
    state.dispatcher.request(HostCommand::RestartPc);
    Json(PcRestartResponse {
        pc_restart_sent: true,
    })
}

#[derive(Debug, Serialize)]
struct PcShutdownResponse {
    pc_shutdown_sent: bool,
}

async fn pc_shutdown(State(state): State<AppState>) -> Json<PcShutdownResponse> {
    info!("received PC shutdown request, sending shutdown signal");
    state.dispatcher.request(HostCommand::ShutdownPc);
    Json(PcShutdownResponse {
        pc_shutdown_sent: true,
    })
}

#[derive(Debug, Deserialize)]
struct WolParams {
    #[serde(default)]
    mac: Option<String>,
}

#[derive(Debug, Serialize)]
struct WolResponse {
    wol_sent: bool,
}

async fn send_wol(Query(params): Query<WolParams>) -> Json<WolResponse> {
    let sent = match params.mac.as_deref() {
        Some(text) => match text.parse::<MacAddr>() {
            Ok(mac) => match wol::send_magic_packet(mac).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("WoL send failed: {e}");
                    false
                }
            },
            Err(e) => {
                warn!("invalid MAC format {text:?}: {e}");
                false
            }
        },
        None => {
            warn!("WoL request without mac parameter");
            false
        }
    };
    Json(WolResponse { wol_sent: sent })
}

#[derive(Debug, Deserialize)]
struct AppParams {
    #[serde(default)]
    app: Option<String>,
}

#[derive(Debug, Serialize)]
struct AppRestartResponse {
    success: bool,
    message: String,
}

async fn restart_app(
    State(state): State<AppState>,
    Query(params): Query<AppParams>,
) -> Json<AppRestartResponse> {
    let Some(app) = params.app.as_deref().and_then(|s| s.parse::<AppTarget>().ok()) else {
        return Json(AppRestartResponse {
            success: false,
            message: "Unknown application".to_string(),
        });
    };
    info!("received app restart request for: {app}");
    // Played out right here, in this handler's context; the response
    // waits for the gesture to finish.
    state.dispatcher.restart_app(app).await;
    let message = match app {
        AppTarget::Parsec => "Parsec restart initiated",
        AppTarget::Anydesk => "Anydesk restart initiated",
    };
    Json(AppRestartResponse {
        success: true,
        message: message.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct SshParams {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Serialize)]
struct SshResponse {
    success: bool,
    message: String,
}

/// Resolve request parameters against the configured defaults.
fn ssh_target(params: &SshParams, defaults: &SshConfig) -> Option<(String, String, String)> {
    let host = params
        .host
        .clone()
        .filter(|h| !h.is_empty())
        .or_else(|| (!defaults.host.is_empty()).then(|| defaults.host.clone()))?;
    let username = params
        .username
        .clone()
        .filter(|u| !u.is_empty())
        .or_else(|| (!defaults.username.is_empty()).then(|| defaults.username.clone()))?;
    let password = params
        .password
        .clone()
        .unwrap_or_else(|| defaults.password.clone());
    Some((host, username, password))
}

/// Run a blocking SSH operation off the async runtime and fold the
/// outcome into the response shape.
async fn ssh_operation<F>(params: SshParams, defaults: &SshConfig, op: F) -> Json<SshResponse>
where
    F: FnOnce(String, String, String) -> Result<String, ssh::SshError> + Send + 'static,
{
    let Some((host, username, password)) = ssh_target(&params, defaults) else {
        return Json(SshResponse {
            success: false,
            message: "no SSH host/username configured".to_string(),
        });
    };
    let outcome = tokio::task::spawn_blocking(move || op(host, username, password)).await;
    match outcome {
        Ok(Ok(message)) => Json(SshResponse {
            success: true,
            message,
        }),
        Ok(Err(e)) => {
            warn!("SSH operation failed: {e}");
            Json(SshResponse {
                success: false,
                message: e.to_string(),
            })
        }
        Err(e) => {
            warn!("SSH worker task failed: {e}");
            Json(SshResponse {
                success: false,
                message: "internal error".to_string(),
            })
        }
    }
}

async fn ssh_shutdown(
    State(state): State<AppState>,
    Query(params): Query<SshParams>,
) -> Json<SshResponse> {
    info!("received SSH shutdown request");
    ssh_operation(params, &state.ssh, |host, username, password| {
        ssh::shutdown_pc(&host, &username, &password).map(|_| "shutdown command sent".to_string())
    })
    .await
}

async fn ssh_restart(
    State(state): State<AppState>,
    Query(params): Query<SshParams>,
) -> Json<SshResponse> {
    info!("received SSH restart request");
    ssh_operation(params, &state.ssh, |host, username, password| {
        ssh::restart_pc(&host, &username, &password).map(|_| "restart command sent".to_string())
    })
    .await
}

async fn ssh_test(
    State(state): State<AppState>,
    Query(params): Query<SshParams>,
) -> Json<SshResponse> {
    info!("received SSH connection test request");
    ssh_operation(params, &state.ssh, |host, username, password| {
        ssh::test_connection(&host, &username, &password)
            .map(|_| "connection and authentication succeeded".to_string())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gadget::HidKeyboard;
    use crate::indicator::NoIndicator;
    use std::io;

    /// Accepts every report and remembers nothing; HTTP tests only
    /// exercise the handler logic.
    struct NullKeyboard;

    impl HidKeyboard for NullKeyboard {
        fn is_mounted(&self) -> bool {
            true
        }
        fn send_report(&self, _modifier: u8, _keycode: u8) -> io::Result<()> {
            Ok(())
        }
        fn release_all(&self) -> io::Result<()> {
            Ok(())
        }
        fn remote_wakeup(&self) -> io::Result<()> {
            Ok(())
        }
    }

    fn state() -> AppState {
        AppState {
            dispatcher: Arc::new(Dispatcher::new(
                Arc::new(NullKeyboard),
                Arc::new(NoIndicator),
            )),
            ssh: Arc::new(SshConfig::default()),
        }
    }

    #[tokio::test]
    async fn wakeup_reports_sent() {
        let Json(resp) = wakeup(State(state())).await;
        assert!(resp.keypress_sent);
    }

    #[tokio::test]
    async fn wol_rejects_bad_mac_shapes() {
        for bad in ["AA:BB:CC:DD:EE:FF", "AABBCCDDEEFF", "AA-BB-CC-DD-EE"] {
            let Json(resp) = send_wol(Query(WolParams {
                mac: Some(bad.to_string()),
            }))
            .await;
            assert!(!resp.wol_sent, "accepted {bad:?}");
        }
    }

    #[tokio::test]
    async fn wol_requires_mac() {
        let Json(resp) = send_wol(Query(WolParams { mac: None })).await;
        assert!(!resp.wol_sent);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_app_rejects_unknown() {
        let Json(resp) = restart_app(
            State(state()),
            Query(AppParams {
                app: Some("notepad".to_string()),
            }),
        )
        .await;
        assert!(!resp.success);
        assert_eq!(resp.message, "Unknown application");
    }

    #[tokio::test(start_paused = true)]
    async fn restart_app_plays_known_gesture() {
        let Json(resp) = restart_app(
            State(state()),
            Query(AppParams {
                app: Some("parsec".to_string()),
            }),
        )
        .await;
        assert!(resp.success);
        assert_eq!(resp.message, "Parsec restart initiated");
    }

    #[tokio::test]
    async fn ssh_without_target_fails_fast() {
        let Json(resp) = ssh_test(State(state()), Query(SshParams {
            host: None,
            username: None,
            password: None,
        }))
        .await;
        assert!(!resp.success);
        assert_eq!(resp.message, "no SSH host/username configured");
    }

    #[test]
    fn ssh_target_prefers_request_params() {
        let defaults = SshConfig {
            host: "10.0.0.1".to_string(),
            username: "default".to_string(),
            password: "defpass".to_string(),
        };
        let params = SshParams {
            host: Some("10.0.0.2".to_string()),
            username: None,
            password: None,
        };
        let (host, username, password) = ssh_target(&params, &defaults).unwrap();
        assert_eq!(host, "10.0.0.2");
        assert_eq!(username, "default");
        assert_eq!(password, "defpass");
    }

    #[test]
    fn ssh_target_requires_some_host() {
        let params = SshParams {
            host: None,
            username: Some("user".to_string()),
            password: None,
        };
        assert!(ssh_target(&params, &SshConfig::default()).is_none());
    }
}
