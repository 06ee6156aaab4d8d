use axum::{
    extract::{ConnectInfo, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing::warn;

use crate::error::AdmissionError;
use crate::AppState;

pub async fn authenticate(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    if state.auth.is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let credential = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if !state.auth.authorize(credential) {
        warn!("Unauthorized access attempt on {}", request.uri().path());
        return AdmissionError::Unauthorized.into_response();
    }

    next.run(request).await
}

pub async fn rate_limit(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    match state.limiter.check(client_ip(&request)) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

/// Peer address of the connection; requests without one share a single bucket.
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}
