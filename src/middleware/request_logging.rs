use actix_web::dev::ServiceRequest;
use actix_web::http::header;
use tracing::Span;

/// Get client IP address from request.
///
/// Uses realip_remote_addr() which respects Forwarded/X-Forwarded-For only when
/// configured via ACTIX_FORWARDED or similar trusted proxy settings.
pub fn get_client_ip(req: &ServiceRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn get_user_agent(req: &ServiceRequest) -> String {
    req.headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

pub fn create_request_span(
    request_id: &str,
    method: &str,
    path: &str,
    client_ip: &str,
    user_agent: &str,
) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        client_ip = %client_ip,
        user_agent = %user_agent
    )
}

/// Get HTTP status class for grouping (2xx, 3xx, 4xx, 5xx)
pub fn get_status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_status_class() {
        assert_eq!(get_status_class(200), "2xx");
        assert_eq!(get_status_class(301), "3xx");
        assert_eq!(get_status_class(404), "4xx");
        assert_eq!(get_status_class(503), "5xx");
        assert_eq!(get_status_class(600), "unknown");
    }

    #[test]
    fn test_get_user_agent() {
        let req = actix_web::test::TestRequest::default().to_srv_request();
        assert_eq!(get_user_agent(&req), "unknown");
    }

    #[test]
    fn test_get_client_ip() {
        let req = actix_web::test::TestRequest::default().to_srv_request();
        assert_eq!(get_client_ip(&req), "unknown");
    }
}
