//! Skips mock-server tests in sandboxes that forbid binding local sockets.

use wiremock::MockServer;

/// Whether binding a loopback socket is impossible in this environment.
pub fn should_skip_socket_bound_test() -> bool {
    match std::net::TcpListener::bind("127.0.0.1:0") {
        Ok(_) => false,
        Err(error) => {
            eprintln!("skipping socket-bound test: {error}");
            true
        }
    }
}

/// Starts a wiremock server, or returns `None` when sockets are unavailable.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if should_skip_socket_bound_test() {
        return None;
    }
    Some(MockServer::start().await)
}

/// Return value for a skipped test body.
pub fn socket_skip_return() {}
