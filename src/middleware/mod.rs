/// Middleware module
///
/// Bearer authentication and request tracing.

mod jwt_middleware;
mod trace_id;

pub use jwt_middleware::JwtMiddleware;
pub use trace_id::{TraceIdMiddleware, TRACE_ID_HEADER};
