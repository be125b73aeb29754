use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::time::Instant;
use tracing::Instrument;

pub const TRACE_ID_HEADER: &str = "x-trace-id";

const MAX_TRACE_ID_LENGTH: usize = 128;

/// Tags every request with a trace id and logs its start and completion.
///
/// The id is taken from the incoming `X-Trace-Id` header when present,
/// otherwise generated, and always echoed back on the response. All log
/// lines emitted while handling the request carry it through the
/// `request` span.
pub struct TraceIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for TraceIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceIdMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(TraceIdMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct TraceIdMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TraceIdMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let trace_id = incoming_trace_id(&req).unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        let method = req.method().to_string();
        let path = req.path().to_string();

        let span = tracing::info_span!(
            "request",
            trace_id = %trace_id,
            method = %method,
            path = %path
        );
        let service = self.service.clone();

        Box::pin(
            async move {
                tracing::info!("Request started");

                let mut res = service.call(req).await?;

                if let Ok(value) = HeaderValue::from_str(&trace_id) {
                    res.headers_mut()
                        .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                }

                tracing::info!(
                    status = res.status().as_u16(),
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Request completed"
                );

                Ok(res)
            }
            .instrument(span),
        )
    }
}

fn incoming_trace_id(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(TRACE_ID_HEADER)?.to_str().ok()?.trim();

    if value.is_empty() || value.len() > MAX_TRACE_ID_LENGTH {
        None
    } else {
        Some(value.to_string())
    }
}
