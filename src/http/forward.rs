//! Request forwarding to the upstream backend.
//!
//! # Responsibilities
//! - Rewrite only the URI scheme/authority to point at the upstream
//! - Pass method, path, and headers through verbatim (Host included)
//! - Stream request and response bodies without buffering either
//! - Classify upstream failures and synthesize the 502 fallback
//!
//! This is a transparent relay, not a header-rewriting proxy: the only
//! content the relay ever fabricates is the 502 body when the upstream
//! cannot be reached.

use axum::body::Body;
use axum::extract::State;
use axum::http::uri::{PathAndQuery, Scheme, Uri};
use axum::http::{header, HeaderValue, Request, Response, StatusCode};
use hyper::body::Incoming;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;

use crate::error::FailureClass;
use crate::http::body::MonitoredBody;
use crate::http::request::RequestId;
use crate::net::session::{RelaySession, SessionState};

/// The only response content the relay ever fabricates.
pub const FALLBACK_BODY: &str = "Proxy error - Backend service may be unavailable";

/// Shared, read-only forwarding state. Set once at startup; sessions
/// never mutate it.
#[derive(Clone)]
pub struct RelayState {
    /// Plaintext client for the upstream leg.
    pub client: Client<HttpConnector, Body>,
    /// Fixed `host:port` of the upstream.
    pub upstream_authority: axum::http::uri::Authority,
}

/// Relay one decrypted request to the upstream and stream the response
/// back. One upstream connection per inbound request; the client's
/// request bytes go upstream in receipt order while the response streams
/// down, and the session records its outcome exactly once.
pub async fn relay_handler(
    State(state): State<RelayState>,
    request: Request<Body>,
) -> Response<Body> {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .copied()
        .unwrap_or_default();

    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let mut session = RelaySession::new(request.method().clone(), path);
    // The handler only runs on a decrypted connection, so the handshake
    // is behind us by construction.
    session.advance(SessionState::HandshakeDone);

    tracing::debug!(
        request_id = %request_id,
        session = %session.id(),
        method = %session.method(),
        path = %session.path(),
        "Relaying request"
    );

    let (parts, body) = request.into_parts();

    // Only the scheme and authority change; path, query, method, and
    // headers all pass through untouched.
    let mut uri_parts = parts.uri.into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream_authority.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    let uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            session.fail(FailureClass::UpstreamError, &e.to_string());
            return internal_error();
        }
    };

    // The upstream leg is plaintext HTTP/1.1 regardless of the protocol
    // the client negotiated, so the version field is left at its default.
    let upstream_req = axum::http::Request::builder().method(parts.method).uri(uri);
    let mut upstream_req = match upstream_req.body(body) {
        Ok(req) => req,
        Err(e) => {
            session.fail(FailureClass::UpstreamError, &e.to_string());
            return internal_error();
        }
    };
    // Wholesale move keeps the client's headers byte-for-byte, Host
    // included.
    *upstream_req.headers_mut() = parts.headers;

    session.advance(SessionState::Forwarding);

    match state.client.request(upstream_req).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            session.set_status(parts.status);
            // Status and headers are copied verbatim; the body streams
            // through MonitoredBody so the access record lands when the
            // stream actually finishes.
            let monitored: MonitoredBody<Incoming> = MonitoredBody::new(body, session);
            Response::from_parts(parts, Body::new(monitored))
        }
        Err(e) => {
            let class = if e.is_connect() {
                FailureClass::UpstreamUnavailable
            } else {
                FailureClass::UpstreamError
            };
            session.set_status(StatusCode::BAD_GATEWAY);
            session.fail(class, &e.to_string());
            bad_gateway()
        }
    }
}

/// The synthesized response for an unreachable upstream. No response
/// bytes have been sent yet in this path, so fabricating a status line is
/// still legal.
fn bad_gateway() -> Response<Body> {
    let mut response = Response::new(Body::from(FALLBACK_BODY));
    *response.status_mut() = StatusCode::BAD_GATEWAY;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain"),
    );
    response
}

/// Unreachable in practice: the URI reassembly above starts from a parsed
/// request and a validated authority.
fn internal_error() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_response_shape() {
        let response = bad_gateway();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain"
        );
    }
}
