pub mod metrics;
pub mod tracing;

pub use self::metrics::metrics_middleware;
pub use self::tracing::{http_trace_layer, request_id_middleware, HttpTraceLayer, REQUEST_ID_HEADER};
