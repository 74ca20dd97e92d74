// WebSocket test utilities

use std::net::TcpListener;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use party_host::middleware::request_trace::RequestTrace;
use party_host::middleware::structured_logger::StructuredLogger;
use party_host::middleware::trace_span::TraceSpan;
use party_host::routes;
use party_host::state::AppState;

/// Start a real HTTP server bound to a random port, so tests can connect
/// with real WebSocket clients.
///
/// Returns `(server_handle, socket_addr, join_handle)`.
pub async fn start_test_server(
    state: AppState,
) -> Result<
    (
        actix_web::dev::ServerHandle,
        std::net::SocketAddr,
        tokio::task::JoinHandle<Result<(), std::io::Error>>,
    ),
    Box<dyn std::error::Error>,
> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let state_data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .configure(routes::configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    let server_handle = server.handle();
    let join = tokio::spawn(server);

    Ok((server_handle, addr, join))
}

/// Polls `check` until it holds or `timeout` elapses.
pub async fn wait_until<F>(
    what: &str,
    timeout: Duration,
    mut check: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnMut() -> bool,
{
    let start = tokio::time::Instant::now();
    loop {
        if check() {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(format!("timeout waiting for {what}").into());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
