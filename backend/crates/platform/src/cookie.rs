//! Cookies
//!
//! `Set-Cookie` values are rendered from a [`SetCookie`]; request cookies
//! are read with [`request_cookies`] / [`extract_cookie`].

use std::fmt::{self, Write};
use std::time::Duration;

use axum::http::{HeaderMap, header};

/// Prefix that binds a cookie to the exact host: requires `Secure`,
/// `Path=/` and no `Domain` attribute.
pub const HOST_PREFIX: &str = "__Host-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

/// Attributes of a cookie the server sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age: Option<Duration>,
}

impl SetCookie {
    /// Host-bound cookie (`__Host-` prefix, `Secure`, `Path=/`).
    ///
    /// `name` is given without the prefix.
    pub fn host_only(name: &str, same_site: SameSite) -> Self {
        Self {
            name: format!("{HOST_PREFIX}{name}"),
            secure: true,
            same_site,
            path: "/".to_string(),
            max_age: None,
        }
    }

    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Browsers drop `__Host-` cookies that are not `Secure` with `Path=/`.
    pub fn satisfies_prefix(&self) -> bool {
        !self.name.starts_with(HOST_PREFIX) || (self.secure && self.path == "/")
    }

    /// Render the full header value for `value`.
    ///
    /// Never `HttpOnly`: the only cookie set here is the CSRF token, which
    /// page scripts must read back into a header.
    pub fn render(&self, value: &str) -> String {
        let mut out = format!("{}={}", self.name, value);
        if self.secure {
            out.push_str("; Secure");
        }
        // Writing into a String cannot fail
        let _ = write!(out, "; SameSite={}; Path={}", self.same_site, self.path);
        if let Some(max_age) = self.max_age {
            let _ = write!(out, "; Max-Age={}", max_age.as_secs());
        }
        out
    }
}

/// All `name=value` pairs sent by the client.
///
/// Proxies may split cookies over several `Cookie` headers, so all of them
/// are read.
pub fn request_cookies(headers: &HeaderMap) -> impl Iterator<Item = (&str, &str)> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            Some((name.trim(), value.trim().trim_matches('"')))
        })
}

/// First value of cookie `name`
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    request_cookies(headers)
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
