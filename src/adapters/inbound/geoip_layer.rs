//! GeoIP Middleware Adapter
//!
//! Tower layer that enriches every request with geolocation data before
//! handing it to the next service in the stack.

use crate::application::GeoEnrichmentService;
use axum::extract::connect_info::{ConnectInfo, MockConnectInfo};
use axum::http::{HeaderMap, Request, Response};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Raw remote address of a connection, as `host:port`.
///
/// Hosts that do not use axum's `ConnectInfo` can insert this into the
/// request extensions instead. It takes precedence over `ConnectInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

/// Layer that wraps services with [`GeoIpService`].
#[derive(Clone)]
pub struct GeoIpLayer {
    service: Arc<GeoEnrichmentService>,
}

impl GeoIpLayer {
    pub fn new(service: Arc<GeoEnrichmentService>) -> Self {
        Self { service }
    }
}

impl<S> Layer<S> for GeoIpLayer {
    type Service = GeoIpService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GeoIpService {
            inner,
            service: self.service.clone(),
        }
    }
}

/// Middleware service.
///
/// For each request it:
/// 1. Resolves the client IP and looks it up
/// 2. Attaches the resulting [`ClientGeo`](crate::domain::ClientGeo) to the request extensions
/// 3. Calls the inner service exactly once
/// 4. Appends the geo headers to the inner service's response
///
/// When the client cannot be located the request passes through untouched
/// and the response carries no geo headers. Errors from the inner service
/// are returned unchanged.
#[derive(Clone)]
pub struct GeoIpService<S> {
    inner: S,
    service: Arc<GeoEnrichmentService>,
}

type ResponseFuture<R, E> = Pin<Box<dyn Future<Output = Result<R, E>> + Send>>;

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for GeoIpService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = ResponseFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let remote_addr = remote_addr(&req);

        let geo_headers = match self.service.enrich(remote_addr.as_deref(), req.headers()) {
            Some((geo, headers)) => {
                req.extensions_mut().insert(geo);
                headers
            }
            None => HeaderMap::new(),
        };

        let response = self.inner.call(req);

        Box::pin(async move {
            let mut response = response.await?;
            let headers = response.headers_mut();
            for (name, value) in geo_headers.iter() {
                headers.append(name.clone(), value.clone());
            }
            Ok(response)
        })
    }
}

/// Remote address of the request's connection, if the host recorded one.
fn remote_addr<B>(req: &Request<B>) -> Option<String> {
    if let Some(RemoteAddr(addr)) = req.extensions().get::<RemoteAddr>() {
        return Some(addr.clone());
    }
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return Some(addr.to_string());
    }
    // Same fallback axum's ConnectInfo extractor applies.
    req.extensions()
        .get::<MockConnectInfo<SocketAddr>>()
        .map(|MockConnectInfo(addr)| addr.to_string())
}
