//! Request origin verification
//!
//! A coarse cross-site check layered on top of CSRF token verification,
//! never a replacement for it.

use axum::http::{HeaderMap, header};
use url::Url;

/// Origin enforcement policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginPolicy {
    /// Production mode. When false every request passes.
    pub enforce: bool,
    /// Allowed origins (`scheme://host[:port]`). Empty means any origin,
    /// as long as one is present.
    pub allowed_origins: Vec<String>,
}

impl OriginPolicy {
    /// Build from environment-style values.
    ///
    /// `allowed_origins_csv` is a comma-separated list; blanks and trailing
    /// slashes are ignored.
    pub fn from_env_values(production: bool, allowed_origins_csv: Option<&str>) -> Self {
        let allowed_origins = allowed_origins_csv
            .unwrap_or_default()
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self {
            enforce: production,
            allowed_origins,
        }
    }

    pub fn development() -> Self {
        Self::default()
    }
}

/// Derive the request origin from `Origin`, else from `Referer`.
pub fn request_origin(headers: &HeaderMap) -> Option<String> {
    if let Some(origin) = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "null")
    {
        return Some(origin.trim_end_matches('/').to_string());
    }

    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let url = Url::parse(referer.trim()).ok()?;
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Check the request's origin against `policy`.
///
/// Outside production this always passes. In production an origin must be
/// derivable, and if an allow-list is configured it must be listed.
pub fn verify_request_origin(headers: &HeaderMap, policy: &OriginPolicy) -> bool {
    if !policy.enforce {
        return true;
    }

    let Some(origin) = request_origin(headers) else {
        tracing::debug!("Request has neither Origin nor Referer");
        return false;
    };

    if policy.allowed_origins.is_empty() {
        return true;
    }

    let allowed = policy
        .allowed_origins
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(&origin));
    if !allowed {
        tracing::debug!(origin = %origin, "Origin not in allow-list");
    }
    allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn production(allowed: &str) -> OriginPolicy {
        OriginPolicy::from_env_values(true, Some(allowed))
    }

    fn headers(pairs: &[(header::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_from_env_values_parses_list() {
        let policy = production(" https://a.example/ ,, https://b.example");
        assert!(policy.enforce);
        assert_eq!(
            policy.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(OriginPolicy::from_env_values(false, None).allowed_origins.is_empty());
    }

    #[test]
    fn test_development_always_passes() {
        assert!(verify_request_origin(&HeaderMap::new(), &OriginPolicy::development()));
    }

    #[test]
    fn test_production_requires_origin_or_referer() {
        let policy = production("");
        assert!(!verify_request_origin(&HeaderMap::new(), &policy));
        assert!(verify_request_origin(
            &headers(&[(header::ORIGIN, "https://anything.example")]),
            &policy
        ));
    }

    #[test]
    fn test_production_allow_list() {
        let policy = production("https://wedding.example");
        assert!(verify_request_origin(
            &headers(&[(header::ORIGIN, "https://wedding.example")]),
            &policy
        ));
        assert!(!verify_request_origin(
            &headers(&[(header::ORIGIN, "https://evil.example")]),
            &policy
        ));
    }

    #[test]
    fn test_referer_is_reduced_to_origin() {
        let policy = production("https://wedding.example");
        let map = headers(&[(header::REFERER, "https://wedding.example/rsvp?code=AB12")]);
        assert_eq!(request_origin(&map).as_deref(), Some("https://wedding.example"));
        assert!(verify_request_origin(&map, &policy));
    }

    #[test]
    fn test_origin_header_wins_over_referer() {
        let map = headers(&[
            (header::ORIGIN, "https://evil.example"),
            (header::REFERER, "https://wedding.example/"),
        ]);
        assert!(!verify_request_origin(&map, &production("https://wedding.example")));
    }

    #[test]
    fn test_null_origin_and_bad_referer_rejected() {
        let map = headers(&[(header::ORIGIN, "null"), (header::REFERER, "not a url")]);
        assert!(request_origin(&map).is_none());
        assert!(!verify_request_origin(&map, &production("")));
    }

    #[test]
    fn test_non_default_port_kept() {
        let map = headers(&[(header::REFERER, "http://localhost:5173/page")]);
        assert_eq!(request_origin(&map).as_deref(), Some("http://localhost:5173"));
    }
}
