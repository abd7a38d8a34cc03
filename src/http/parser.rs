//! Raw HTTP request parsing.
//!
//! Parses request text as captured by intercepting proxies (request line, headers, blank
//! line, body) and works out which URL it was aimed at.

use super::{FieldMap, split_field};

/// A captured request broken into the pieces the executor sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    pub method: String,
    pub url: String,
    pub headers: FieldMap,
    pub body: Option<String>,
}

/// Parse a raw HTTP request. `base_url` takes priority over the `Host` header when the
/// request line only carries a path.
///
/// Malformed input still produces a request. The body is the remainder of the text
/// re-joined with `\n`; `Content-Length` is not consulted.
#[must_use]
pub fn parse_raw_request(raw: &str, base_url: Option<&str>) -> RawRequest {
    let normalized = raw.replace("\r\n", "\n");
    let lines: Vec<&str> = normalized.trim().split('\n').collect();

    let mut parts = lines[0].split_whitespace();
    let method = parts.next().unwrap_or("GET").to_uppercase();
    let target = parts.next().unwrap_or("/");

    let mut headers = FieldMap::new();
    let mut body_start = lines.len();
    for (i, line) in lines.iter().enumerate().skip(1) {
        if line.trim().is_empty() {
            body_start = i + 1;
            break;
        }
        if let Some((name, value)) = split_field(line) {
            headers.insert(name, value);
        }
    }

    let body = (body_start < lines.len()).then(|| lines[body_start..].join("\n"));
    let url = resolve_url(target, base_url, &headers);

    RawRequest {
        method,
        url,
        headers,
        body,
    }
}

fn resolve_url(target: &str, base_url: Option<&str>, headers: &FieldMap) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        return target.to_owned();
    }

    if let Some(base) = base_url.filter(|b| !b.is_empty()) {
        return format!("{}{target}", base.trim_end_matches('/'));
    }

    let host = headers
        .iter()
        .find_map(|(name, value)| name.eq_ignore_ascii_case("host").then_some(value.as_str()))
        .filter(|h| !h.is_empty());

    match host {
        // Port 443 anywhere in the Host value is taken to mean TLS.
        Some(host) => {
            let scheme = if host.contains("443") { "https" } else { "http" };
            format!("{scheme}://{host}{target}")
        }
        None => target.to_owned(),
    }
}
