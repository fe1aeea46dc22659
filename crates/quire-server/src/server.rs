//! Development server implementation.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::{broadcast::error::RecvError, Mutex};
use tower_http::services::ServeDir;

use quire_static::{BuildConfig, BuildError, BuildResult, StaticBuilder};

use crate::livereload::{
    livereload_client_script, ReloadHub, ReloadMessage, LIVERELOAD_PATH, LIVERELOAD_SCRIPT_PATH,
};
use crate::watcher::FileWatcher;

/// Quiet period after a change before rebuilding, so editors that write
/// a file in several steps trigger one build.
const DEBOUNCE: Duration = Duration::from_millis(150);

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Build settings; the output directory is what gets served
    pub build: BuildConfig,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            port: 8000,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Shared server state.
struct ServerState {
    builder: StaticBuilder,
    hub: ReloadHub,
    /// Held for the duration of a build
    build_lock: Mutex<()>,
}

impl ServerState {
    fn new(mut build: BuildConfig) -> Self {
        build.live_reload = Some(LIVERELOAD_SCRIPT_PATH.to_string());
        Self {
            builder: StaticBuilder::new(build),
            hub: ReloadHub::new(),
            build_lock: Mutex::new(()),
        }
    }
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Build the site, then serve it and rebuild on every content change.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::InvalidAddress(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let content_dir = self.config.build.content_dir.clone();
        let output_dir = self.config.build.output_dir.clone();
        let state = Arc::new(ServerState::new(self.config.build.clone()));

        // A broken initial build still serves whatever output exists
        let _ = rebuild(&state).await;

        let (watcher, mut rx) = FileWatcher::new(&[content_dir])
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                tracing::info!("Changed: {}", event.path().display());

                tokio::time::sleep(DEBOUNCE).await;
                while rx.try_recv().is_ok() {}

                let _ = rebuild(&state_clone).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = router(state, &output_dir);

        tracing::info!("Starting dev server at http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::debug!("Could not open browser: {}", e);
            }
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Routes for live reload, with everything else served from the output directory.
fn router(state: Arc<ServerState>, output_dir: &Path) -> Router {
    Router::new()
        .route(LIVERELOAD_PATH, get(ws_handler))
        .route(LIVERELOAD_SCRIPT_PATH, get(livereload_script_handler))
        .fallback_service(ServeDir::new(output_dir))
        .with_state(state)
}

/// Rebuild the site and notify browsers.
///
/// Builds never overlap. A failed build is reported to browsers and the
/// previous output stays in place.
async fn rebuild(state: &ServerState) -> Result<BuildResult, BuildError> {
    let _guard = state.build_lock.lock().await;

    match state.builder.build().await {
        Ok(result) => {
            tracing::info!(
                "Built {} pages ({} posts, {} tags) in {}ms",
                result.pages,
                result.posts,
                result.tags,
                result.duration_ms
            );
            state.hub.send(ReloadMessage::Reload);
            Ok(result)
        }
        Err(e) => {
            tracing::error!("Build failed: {}", e);
            state.hub.send(ReloadMessage::BuildFailed {
                message: e.to_string(),
            });
            Err(e)
        }
    }
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Forward reload messages to one browser until it disconnects.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    if !send_message(&mut socket, &ReloadMessage::Connected).await {
        return;
    }

    loop {
        match rx.recv().await {
            Ok(msg) => {
                if !send_message(&mut socket, &msg).await {
                    break;
                }
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> bool {
    let Ok(json) = serde_json::to_string(msg) else {
        return false;
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

/// Handler for the live reload client script.
async fn livereload_script_handler() -> impl IntoResponse {
    let script = livereload_client_script(LIVERELOAD_PATH);
    ([("content-type", "application/javascript")], script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn creates_server_with_default_config() {
        let server = DevServer::new(DevServerConfig::default());
        assert_eq!(server.config.port, 8000);
        assert!(server.config.open);
    }

    #[tokio::test]
    async fn rebuild_injects_live_reload_and_notifies() {
        let temp = tempdir().unwrap();
        let content = temp.path().join("content");
        let output = temp.path().join("public");
        fs::create_dir_all(&content).unwrap();
        fs::write(content.join("hello.md"), "---\ntitle: Hello\n---\nHi").unwrap();

        let state = ServerState::new(BuildConfig {
            content_dir: content,
            output_dir: output.clone(),
            ..Default::default()
        });
        let mut rx = state.hub.subscribe();

        let result = rebuild(&state).await.unwrap();

        assert_eq!(result.posts, 1);
        assert_eq!(rx.try_recv().unwrap(), ReloadMessage::Reload);
        let page = fs::read_to_string(output.join("blog/hello/index.html")).unwrap();
        assert!(page.contains("__livereload.js"));
    }

    #[tokio::test]
    async fn failed_rebuild_keeps_previous_output() {
        let temp = tempdir().unwrap();
        let content = temp.path().join("content");
        let output = temp.path().join("public");
        fs::create_dir_all(&content).unwrap();
        fs::write(content.join("hello.md"), "---\ntitle: Hello\n---\nHi").unwrap();

        let state = ServerState::new(BuildConfig {
            content_dir: content.clone(),
            output_dir: output.clone(),
            ..Default::default()
        });
        rebuild(&state).await.unwrap();

        let mut rx = state.hub.subscribe();
        fs::write(content.join("broken.md"), "---\ntitle: Broken\n").unwrap();

        assert!(rebuild(&state).await.is_err());
        assert!(matches!(
            rx.try_recv().unwrap(),
            ReloadMessage::BuildFailed { .. }
        ));
        assert!(output.join("blog/hello/index.html").exists());
    }
}
