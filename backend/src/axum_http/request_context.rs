use axum::http::{HeaderMap, header::USER_AGENT};
use visa_core::domain::value_objects::audit::RequestContext;

/// Client address and agent as seen through the reverse proxy.
pub fn request_context(headers: &HeaderMap) -> RequestContext {
    let ip_address = header_value(headers, "x-forwarded-for")
        .and_then(|forwarded| forwarded.split(',').next().map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty())
        .or_else(|| header_value(headers, "x-real-ip"));

    RequestContext {
        ip_address,
        user_agent: header_value(headers, USER_AGENT.as_str()),
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_forwarded_address_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.2".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        headers.insert(USER_AGENT, "Mozilla/5.0".parse().unwrap());

        let context = request_context(&headers);
        assert_eq!(context.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(context.user_agent.as_deref(), Some("Mozilla/5.0"));
    }
}
