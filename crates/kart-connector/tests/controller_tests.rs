//! Startup pipeline and sync handling against a local name server.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use kart_connector::{Controller, KartConfig};
use kart_protocol::ConnectionState;
use tokio::time::timeout;

/// Behaviour of the fake name server.
#[derive(Clone)]
struct NameServer {
    /// Sent as soon as a client connects.
    greeting: String,
    /// Close right after the greeting instead of serving commands.
    hang_up: bool,
}

async fn ws_handler(ws: WebSocketUpgrade, State(server): State<NameServer>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_socket(socket, server))
}

async fn serve_socket(mut socket: WebSocket, server: NameServer) {
    let mut current: Vec<String> = server.greeting.split(',').map(str::to_string).collect();
    if socket
        .send(Message::Text(current.join(",").into()))
        .await
        .is_err()
    {
        return;
    }
    if server.hang_up {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }
    while let Some(Ok(message)) = socket.recv().await {
        if let Message::Text(text) = message {
            if text.as_str() == "SCRAMBLE" {
                current.rotate_left(1);
                if socket
                    .send(Message::Text(current.join(",").into()))
                    .await
                    .is_err()
                {
                    return;
                }
            }
        }
    }
}

async fn spawn_name_server(greeting: &str, hang_up: bool) -> SocketAddr {
    let server = NameServer {
        greeting: greeting.to_string(),
        hang_up,
    };
    let app = Router::new().route("/", get(ws_handler)).with_state(server);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn config_for(dir: &Path, layout: &str, addr: SocketAddr) -> KartConfig {
    let layout_path = dir.join("layout.txt");
    std::fs::write(&layout_path, layout).unwrap();

    let mut config = KartConfig::default();
    config.layout.source = layout_path.to_string_lossy().into_owned();
    config.sync.host = addr.ip().to_string();
    config.sync.port = addr.port();
    config.names.cache_path = Some(dir.join("names.json"));
    config
}

async fn step(controller: &mut Controller) {
    let progressed = timeout(Duration::from_secs(5), controller.step())
        .await
        .expect("event timeout");
    assert!(progressed, "event queue closed early");
}

#[tokio::test]
async fn test_startup_paints_defaults_then_follows_server() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_name_server("A,B,C,D", false).await;
    let config = config_for(dir.path(), "/* table */\n0 1\n2 3\n", addr);

    let mut controller = Controller::start(&config).await.unwrap();

    // Sixteen default names over four spots: in-range labels painted, surplus flagged.
    assert_eq!(controller.state().grid.labels(), vec!["0", "1", "2", "3"]);
    assert_eq!(controller.state().mismatches, 1);

    step(&mut controller).await; // Opened
    assert_eq!(controller.state().connection, ConnectionState::Open);

    step(&mut controller).await; // greeting
    assert_eq!(controller.state().grid.labels(), vec!["A", "B", "C", "D"]);
    assert_eq!(controller.state().names.names().as_slice(), &["A", "B", "C", "D"]);

    assert!(controller.scramble());
    // Nothing changes locally until the server answers.
    assert_eq!(controller.state().grid.labels(), vec!["A", "B", "C", "D"]);

    step(&mut controller).await;
    assert_eq!(controller.state().grid.labels(), vec!["B", "C", "D", "A"]);
    assert_eq!(controller.state().frames_received, 2);
    assert!(!controller.state().stale);
}

#[tokio::test]
async fn test_cached_names_seed_the_grid() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_name_server("A,B", false).await;
    let config = config_for(dir.path(), "01", addr);
    std::fs::write(dir.path().join("names.json"), r#"{"kart": "Ana,Bo"}"#).unwrap();

    let controller = Controller::start(&config).await.unwrap();
    assert_eq!(controller.state().grid.labels(), vec!["Ana", "Bo"]);
    assert_eq!(controller.state().mismatches, 0);
}

#[tokio::test]
async fn test_scramble_before_open_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_name_server("A,B", false).await;
    let config = config_for(dir.path(), "01", addr);

    let mut controller = Controller::start(&config).await.unwrap();
    assert!(!controller.scramble());

    step(&mut controller).await; // Opened
    step(&mut controller).await; // greeting
    assert_eq!(controller.state().grid.labels(), vec!["A", "B"]);
    assert_eq!(controller.state().frames_received, 1);
}

#[tokio::test]
async fn test_server_hang_up_marks_stale() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_name_server("X,Y", true).await;
    let config = config_for(dir.path(), "01", addr);

    let mut controller = Controller::start(&config).await.unwrap();
    step(&mut controller).await; // Opened
    step(&mut controller).await; // greeting
    step(&mut controller).await; // lost

    let state = controller.state();
    assert!(state.stale);
    assert_eq!(state.connection, ConnectionState::Closed);
    assert_eq!(state.grid.labels(), vec!["X", "Y"]);
    assert!(!controller.scramble());
}

#[tokio::test]
async fn test_headless_run_fails_when_server_hangs_up() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_name_server("X,Y", true).await;
    let config = config_for(dir.path(), "01", addr);

    let controller = Controller::start(&config).await.unwrap();
    let input = tokio::io::BufReader::new(tokio::io::empty());
    let err = timeout(Duration::from_secs(5), controller.run_headless_with(input))
        .await
        .expect("headless run should end")
        .expect_err("connection loss must fail the run");
    let chain = format!("{err:#}");
    assert!(chain.contains("labels are stale"), "{chain}");
}

#[tokio::test]
async fn test_missing_layout_aborts_startup() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = KartConfig::default();
    config.layout.source = dir.path().join("absent.txt").to_string_lossy().into_owned();
    config.names.cache_path = Some(dir.path().join("names.json"));

    let err = Controller::start(&config).await.err().expect("startup must fail");
    let chain = format!("{err:#}");
    assert!(chain.contains("layout unavailable"), "{chain}");
}

#[tokio::test]
async fn test_empty_layout_aborts_startup() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_name_server("A", false).await;
    let config = config_for(dir.path(), "/* only a comment */\n", addr);
    assert!(Controller::start(&config).await.is_err());
}
