//! Middleware shared by every route

pub mod request_tracking;

pub use request_tracking::{
    sensitive_headers_layer, MakeRequestUuid, RequestTracking, DEFAULT_REQUEST_ID_HEADER,
    SENSITIVE_HEADERS,
};
