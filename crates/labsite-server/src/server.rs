//! Preview server implementation.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::services::ServeDir;

use labsite_static::{BuildConfig, BuildError, SiteBuilder};

use crate::rebuild::rebuild_loop;
use crate::watcher::{FileWatcher, WatchTarget};
use crate::websocket::{
    inject_script, livereload_client_script, ReloadHub, ReloadMessage, LIVERELOAD_PATH,
    LIVERELOAD_SCRIPT_PATH,
};

/// Configuration for the preview server.
#[derive(Debug, Clone)]
pub struct PreviewServerConfig {
    /// Build run at start and on every change
    pub build: BuildConfig,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for PreviewServerConfig {
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
    #[error("Failed to bind to {addr}: {message}")]
    Bind { addr: String, message: String },

    #[error("File watch error: {0}")]
    Watch(String),

    #[error("Initial build failed: {0}")]
    Build(#[from] BuildError),
}

/// Shared server state.
struct ServerState {
    output_dir: PathBuf,
    hub: ReloadHub,
}

/// Serves the output directory and rebuilds it when inputs change.
pub struct PreviewServer {
    config: PreviewServerConfig,
}

impl PreviewServer {
    pub fn new(config: PreviewServerConfig) -> Self {
        Self { config }
    }

    /// Build once, then serve until the process is stopped.
    ///
    /// A failing initial build aborts; later failures are logged and the
    /// last good output keeps being served.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr_text = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = addr_text.parse().map_err(|e| ServerError::Bind {
            addr: addr_text.clone(),
            message: format!("{}", e),
        })?;

        let builder = Arc::new(SiteBuilder::new(self.config.build.clone()));
        let result = builder.build()?;
        tracing::info!(
            "Built {} in {}ms",
            result.output_dir.display(),
            result.duration_ms
        );

        let output_dir = absolute(&self.config.build.output_dir);
        let hub = ReloadHub::new();

        let targets = watch_targets(&self.config.build);
        let (watcher, rx) =
            FileWatcher::new(&targets).map_err(|e| ServerError::Watch(e.to_string()))?;

        let loop_hub = hub.clone();
        let ignore = output_dir.clone();
        tokio::spawn(async move {
            rebuild_loop(builder, rx, loop_hub, ignore).await;
            drop(watcher);
        });

        let state = Arc::new(ServerState {
            output_dir: output_dir.clone(),
            hub,
        });

        let app = Router::new()
            .route("/", get(index_handler))
            .route("/index.html", get(index_handler))
            .route(LIVERELOAD_PATH, get(ws_handler))
            .route(LIVERELOAD_SCRIPT_PATH, get(script_handler))
            .fallback_service(ServeDir::new(&output_dir))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.to_string(),
                message: e.to_string(),
            })?;

        let url = format!("http://{}", addr);
        tracing::info!("Serving {} at {}", output_dir.display(), url);

        if self.config.open {
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}

/// Directories holding the build inputs. Input files are watched through
/// their parent directory so editors that save by rename are still seen.
fn watch_targets(config: &BuildConfig) -> Vec<WatchTarget> {
    let mut targets: Vec<WatchTarget> = Vec::new();

    for file in [
        &config.data_path,
        &config.bibliography_path,
        &config.template_path,
    ] {
        let dir = absolute(parent_dir(file));
        if !targets.iter().any(|t| t.path == dir) {
            targets.push(WatchTarget::dir(dir));
        }
    }

    if config.profile.publishes_assets() {
        targets.push(WatchTarget::tree(absolute(&config.assets_dir)));
    }

    targets
}

fn parent_dir(file: &Path) -> &Path {
    match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Watcher events carry absolute paths.
fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    })
}

/// Read the built page and add the live-reload script.
fn render_index(output_dir: &Path) -> Result<String, std::io::Error> {
    let html = std::fs::read_to_string(output_dir.join("index.html"))?;
    Ok(inject_script(&html))
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    match render_index(&state.output_dir) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!("Failed to read index.html: {}", e);
            (StatusCode::NOT_FOUND, "index.html has not been built").into_response()
        }
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|e| {
        tracing::warn!("Failed to encode reload message: {}", e);
    })?;
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

async fn script_handler() -> impl IntoResponse {
    (
        [("content-type", "application/javascript")],
        livereload_client_script(),
    )
}
