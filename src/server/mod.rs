//! Development server with live reload, theme switching and page transitions

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::commands::generate;
use crate::routes::{Route, Site};
use crate::theme::Theme;
use crate::transition::{FsAssetProbe, Orchestrator, RouteAssets};
use crate::Folio;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    folio: Folio,
    public_dir: PathBuf,
    /// Latest loaded content, swapped after each regeneration
    site: RwLock<Arc<Site>>,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    fn site(&self) -> Arc<Site> {
        match self.site.read() {
            Ok(site) => site.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Rebuild the site and tell connected pages to reload
    fn regenerate(&self) -> Result<()> {
        let site = generate::build(&self.folio, true)?;
        match self.site.write() {
            Ok(mut current) => *current = Arc::new(site),
            Err(poisoned) => *poisoned.into_inner() = Arc::new(site),
        }
        let _ = self.reload_tx.send(());
        Ok(())
    }

    /// Assets a navigation to `path` should wait for
    fn route_assets(&self, path: &str) -> RouteAssets {
        let fonts = &self.folio.config.transition.fonts;
        match Route::parse(strip_root(path, &self.folio.config.root)) {
            Some(route) => self.site().route_assets(&route, fonts),
            None => RouteAssets {
                fonts: fonts.clone(),
                images: Vec::new(),
            },
        }
    }
}

/// Message sent by the client runtime on `/__transition`
#[derive(Debug, Deserialize)]
struct NavigateRequest {
    path: String,
}

#[derive(Debug, Serialize)]
struct ThemeResponse {
    theme: Theme,
}

/// Start the development server with an already generated `site`
pub async fn start(
    folio: &Folio,
    site: Site,
    ip: &str,
    port: u16,
    watch: bool,
    open: bool,
) -> Result<()> {
    // Create broadcast channel for live reload notifications
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        folio: folio.clone(),
        public_dir: folio.public_dir.clone(),
        site: RwLock::new(Arc::new(site)),
        reload_tx,
        live_reload: watch,
    });

    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .route("/__transition", get(transition_handler))
        .route("/__theme", get(theme_handler))
        .route("/__theme/toggle", post(theme_toggle_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", ip, port, folio.config.root);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    // Pages bake the theme's colors, so a theme change means a rebuild
    tokio::spawn(follow_theme(state.clone()));

    if watch {
        let watch_state = state.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(watch_state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Regenerate whenever the theme provider changes
async fn follow_theme(state: Arc<ServerState>) {
    let mut changes = WatchStream::from_changes(state.folio.theme.subscribe());
    while let Some(theme) = changes.next().await {
        tracing::info!("Theme changed to {}, regenerating", theme);
        let state = state.clone();
        let result = tokio::task::spawn_blocking(move || state.regenerate()).await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Generation failed: {:#}", e),
            Err(e) => tracing::error!("Generation task failed: {}", e),
        }
    }
}

/// Regenerate and reload on source or config changes. Blocks the calling thread.
fn watch_and_reload(state: Arc<ServerState>) -> Result<()> {
    generate::watch_changes(&state.folio, || state.regenerate())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// WebSocket handler driving page transitions
async fn transition_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_transition_socket(socket, state))
}

/// One orchestrator per connection; each text message is a navigation
async fn handle_transition_socket(mut socket: WebSocket, state: Arc<ServerState>) {
    let probe = Arc::new(FsAssetProbe::new(&state.public_dir));
    let mut orchestrator = Orchestrator::new(state.folio.config.transition.clone(), probe);
    let mut status_rx = orchestrator.subscribe();
    tracing::debug!("Transition client connected");

    loop {
        tokio::select! {
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = status_rx.borrow_and_update().clone();
                let json = match serde_json::to_string(&status) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::warn!("Failed to encode transition status: {}", e);
                        continue;
                    }
                };
                if socket.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<NavigateRequest>(&text) {
                            Ok(request) => {
                                let assets = state.route_assets(&request.path);
                                orchestrator.navigate(&request.path, assets);
                            }
                            Err(e) => tracing::warn!("Ignoring bad transition message: {}", e),
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Transition client disconnected");
}

async fn theme_handler(State(state): State<Arc<ServerState>>) -> Json<ThemeResponse> {
    Json(ThemeResponse {
        theme: state.folio.theme.current(),
    })
}

/// Flip the theme; the rebuild happens in `follow_theme`
async fn theme_toggle_handler(State(state): State<Arc<ServerState>>) -> Json<ThemeResponse> {
    Json(ThemeResponse {
        theme: state.folio.theme.toggle(),
    })
}

/// Fallback handler that serves files and injects live reload script
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let path = strip_root(request.uri().path(), &state.folio.config.root).to_string();

    let Some(file_path) = resolve_file(&state.public_dir, &path) else {
        return not_found(&state, &path).await;
    };

    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);

    if is_html {
        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => Html(decorate(&state, &content)).into_response(),
            Err(_) => not_found(&state, &path).await,
        }
    } else {
        // Serve static file using tower-http
        let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
        match service.try_call(request).await {
            Ok(response) => response.into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }
}

/// The listing's not-found page with a 404 status
async fn not_found(state: &ServerState, path: &str) -> Response {
    let page = not_found_file(&state.public_dir, path);
    match tokio::fs::read_to_string(&page).await {
        Ok(content) => (StatusCode::NOT_FOUND, Html(decorate(state, &content))).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

fn decorate(state: &ServerState, html: &str) -> String {
    if state.live_reload {
        inject_live_reload(html)
    } else {
        html.to_string()
    }
}

/// Drop the configured site root from a request path
fn strip_root<'a>(path: &'a str, root: &str) -> &'a str {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return path;
    }
    match path.strip_prefix(root) {
        Some(rest) if rest.is_empty() => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

/// Existing file under `public_dir` for a request path
fn resolve_file(public_dir: &Path, path: &str) -> Option<PathBuf> {
    let clean_path = path.trim_start_matches('/');
    if clean_path.split('/').any(|segment| segment == "..") {
        return None;
    }

    let candidate = public_dir.join(clean_path);
    if candidate.is_dir() {
        let index = candidate.join("index.html");
        return index.is_file().then_some(index);
    }
    if candidate.is_file() {
        return Some(candidate);
    }

    let with_html = public_dir.join(format!("{}.html", clean_path.trim_end_matches('/')));
    with_html.is_file().then_some(with_html)
}

/// The not-found page for a missing path: the listing's own page for
/// unknown detail routes, the site-wide one otherwise
fn not_found_file(public_dir: &Path, path: &str) -> PathBuf {
    Route::parse(path)
        .and_then(|route| route.listing())
        .map(|listing| public_dir.join(listing.dir()).join("404.html"))
        .filter(|page| page.is_file())
        .unwrap_or_else(|| public_dir.join("404.html"))
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_strip_root() {
        assert_eq!(strip_root("/blog/", "/"), "/blog/");
        assert_eq!(strip_root("/site/blog/", "/site/"), "/blog/");
        assert_eq!(strip_root("/site", "/site/"), "/");
        assert_eq!(strip_root("/sitemap.xml", "/site/"), "/sitemap.xml");
    }

    #[test]
    fn test_resolve_file() {
        let dir = tempfile::tempdir().unwrap();
        let public = dir.path();
        fs::create_dir_all(public.join("blog/hello")).unwrap();
        fs::write(public.join("blog/hello/index.html"), "post").unwrap();
        fs::write(public.join("404.html"), "missing").unwrap();

        assert_eq!(
            resolve_file(public, "/blog/hello/"),
            Some(public.join("blog/hello/index.html"))
        );
        assert_eq!(resolve_file(public, "/404"), Some(public.join("404.html")));
        assert_eq!(resolve_file(public, "/blog/"), None);
        assert_eq!(resolve_file(public, "/../secret"), None);
    }

    #[test]
    fn test_not_found_file_prefers_listing() {
        let dir = tempfile::tempdir().unwrap();
        let public = dir.path();
        fs::create_dir_all(public.join("projects")).unwrap();
        fs::write(public.join("projects/404.html"), "projects").unwrap();
        fs::write(public.join("404.html"), "site").unwrap();

        assert_eq!(
            not_found_file(public, "/projects/does-not-exist/"),
            public.join("projects/404.html")
        );
        // Listing page exists only for projects here
        assert_eq!(
            not_found_file(public, "/journal/does-not-exist/"),
            public.join("404.html")
        );
        assert_eq!(not_found_file(public, "/nowhere/at/all"), public.join("404.html"));
    }

    #[test]
    fn test_inject_live_reload() {
        let html = inject_live_reload("<html><body><p>hi</p></body></html>");
        assert!(html.contains("/__livereload"));
        assert!(html.ends_with("</body>\n</html>"));
        assert_eq!(html.matches("</body>").count(), 1);
    }

    #[test]
    fn test_navigate_request() {
        let request: NavigateRequest = serde_json::from_str(r#"{"path":"/blog/"}"#).unwrap();
        assert_eq!(request.path, "/blog/");
    }
}
