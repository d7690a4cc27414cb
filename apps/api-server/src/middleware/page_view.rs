//! Page-view recording.
//!
//! Runs after the handler so the matched route is known. The view is
//! awaited before the response is returned; a failed insert is logged and
//! the response goes out unchanged.

use std::future::{Future, Ready, ready};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use actix_web::{
    Error, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
};
use digihub_core::domain::ClickContext;
use digihub_core::services::{PageHit, PageViewRecorder, RouteMatch};

pub struct PageViewMiddleware {
    recorder: Arc<PageViewRecorder>,
}

impl PageViewMiddleware {
    pub fn new(recorder: Arc<PageViewRecorder>) -> Self {
        Self { recorder }
    }
}

impl<S, B> Transform<S, ServiceRequest> for PageViewMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = PageViewService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(PageViewService {
            service,
            recorder: self.recorder.clone(),
        }))
    }
}

pub struct PageViewService<S> {
    service: S,
    recorder: Arc<PageViewRecorder>,
}

impl<S, B> Service<ServiceRequest> for PageViewService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let recorder = self.recorder.clone();
        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            let hit = page_hit(res.request());

            match recorder.record(hit).await {
                Ok(Some(view)) => {
                    tracing::debug!(url = %view.url, post_id = ?view.post_id, "Page view recorded");
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(path = %res.request().path(), error = %e, "Page view not recorded");
                }
            }

            Ok(res)
        })
    }
}

/// Describe a handled request for the recorder.
fn page_hit(req: &HttpRequest) -> PageHit {
    let url = {
        let info = req.connection_info();
        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| req.path());
        format!("{}://{}{}", info.scheme(), info.host(), path_and_query)
    };

    let route = req.match_name().map(|name| {
        RouteMatch::from_route_name(name, req.match_info().get("slug").map(String::from))
    });

    PageHit {
        path: req.path().to_string(),
        url,
        route,
        caller: caller_context(req),
    }
}

/// Client address, user agent and referrer of a request.
///
/// The address honours `Forwarded` and `X-Forwarded-For` before the peer
/// address; a missing header is an empty string.
pub fn caller_context(req: &HttpRequest) -> ClickContext {
    let ip_address = req.connection_info().realip_remote_addr().map(|addr| {
        addr.parse::<SocketAddr>()
            .map(|socket| socket.ip().to_string())
            .unwrap_or_else(|_| addr.to_string())
    });

    ClickContext {
        ip_address,
        user_agent: header_text(req, header::USER_AGENT),
        referrer: header_text(req, header::REFERER),
    }
}

fn header_text(req: &HttpRequest, name: header::HeaderName) -> String {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
