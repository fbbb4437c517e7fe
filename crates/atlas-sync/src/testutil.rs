//! Test support: loopback mock module backends.

use axum::Router;

use crate::config::GatewayConfig;
use crate::session::SessionContext;
use crate::transport::Transport;

/// Serves `router` on an ephemeral loopback port and returns its base URL.
pub(crate) async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve mock backend");
    });
    format!("http://{}", addr)
}

/// A transport pointed at `base_url` with default settings and no session.
pub(crate) fn transport_for(base_url: &str) -> Transport {
    let mut config = GatewayConfig::default();
    config.gateway.base_url = base_url.to_string();
    Transport::new(config, SessionContext::new()).expect("build transport")
}
