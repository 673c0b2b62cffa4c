//! Client network origin extraction

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

/// Best-effort network origin of the caller
///
/// First hop of `X-Forwarded-For` when present (the gateway usually sits
/// behind a proxy), otherwise the peer IP, otherwise `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOrigin(pub String);

impl<S> FromRequestParts<S> for ClientOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string);

        let origin = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self(origin))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(request: Request<()>) -> String {
        let (mut parts, ()) = request.into_parts();
        let ClientOrigin(origin) = ClientOrigin::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        origin
    }

    #[tokio::test]
    async fn test_forwarded_for_first_hop() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await, "203.0.113.7");
    }

    #[tokio::test]
    async fn test_peer_address() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 20], 51234))));
        assert_eq!(extract(request).await, "192.168.1.20");
    }

    #[tokio::test]
    async fn test_unknown_origin() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(extract(request).await, "unknown");
    }
}
