//! ss-api Middleware
//!
//! Request logging and CORS for the JSON API.

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::Logger;

/// Access log line per request, emitted through the `log` facade.
// remote-ip "request-line" status-code response-size duration
pub fn standard_middleware() -> Logger {
    Logger::new("%a \"%r\" %s %b %Dms")
}

// The web client may be served from another origin than the API.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allowed_header(crate::handlers::FILE_NAME_HEADER)
        .max_age(3600)
}
