//! Liveness endpoints.

pub async fn health() -> &'static str {
    "OK!"
}

pub async fn ping() -> &'static str {
    "pong"
}
