use axum::http::{HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Parse configured origins into header values; at least one is required.
pub fn parse_origins(origins: &[String]) -> io::Result<Vec<HeaderValue>> {
    let parsed = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS origin: {}", e),
            )
        })?;

    if parsed.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "At least one CORS origin is required",
        ));
    }

    Ok(parsed)
}

/// Credentialed CORS for the chat frontend.
///
/// Credentials are allowed so the session cookie travels with fetch calls,
/// which is why origins must be listed explicitly.
pub fn create_cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::COOKIE,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_skips_blanks() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            " ".to_string(),
            "http://localhost:8080".to_string(),
        ];
        assert_eq!(parse_origins(&origins).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_origins_requires_one() {
        assert!(parse_origins(&[]).is_err());
    }

    #[test]
    fn test_parse_origins_rejects_control_chars() {
        assert!(parse_origins(&["http://bad\norigin".to_string()]).is_err());
    }
}
