use axum::http::HeaderValue;
use axum::http::header::InvalidHeaderValue;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

/// Creates a CORS layer from the configured allowed origins.
///
/// - `*` anywhere in the list allows any origin, method and header, without
///   credentials (browsers reject credentials with a wildcard origin).
/// - Otherwise only the listed origins are allowed, with credentials, and
///   the requested methods and headers are mirrored back.
///
/// # Errors
/// Returns an error if an origin is not a valid header value.
pub fn create_cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, InvalidHeaderValue> {
    if allowed_origins.iter().any(|origin| origin == "*") {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .max_age(Duration::from_secs(3600)));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600)))
}
