//! Outbound request execution.
//!
//! Every call builds its own blocking client and drops it before returning, so nothing
//! (connections, cookies, DNS cache) is shared between tool invocations.

use core::time::Duration;
use std::time::Instant;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url, Version, redirect};
use tracing::debug;

use crate::error::Error;
use crate::http::FieldMap;

/// A fully normalized request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: String,
    pub url: String,
    pub query: Option<FieldMap>,
    pub headers: FieldMap,
    pub body: Option<Vec<u8>>,
    /// Content-Type to fall back on when a body is sent without one.
    pub content_type_hint: Option<String>,
}

impl PreparedRequest {
    /// Fill in `Content-Type` from the hint when there is a body and the caller did not set one.
    fn apply_content_type_hint(&mut self) {
        let Some(hint) = self.content_type_hint.as_ref() else {
            return;
        };
        let has_body = self.body.as_ref().is_some_and(|b| !b.is_empty());
        let has_content_type = self
            .headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case("content-type"));
        if has_body && !has_content_type {
            self.headers.insert("Content-Type".to_owned(), hint.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecuteOptions {
    pub timeout: Duration,
    pub follow_redirects: bool,
    pub verify_tls: bool,
}

impl ExecuteOptions {
    /// Build options from a timeout in (possibly fractional) seconds.
    pub fn new(timeout_secs: f64, follow_redirects: bool, verify_tls: bool) -> Result<Self, Error> {
        let timeout = Duration::try_from_secs_f64(timeout_secs)
            .map_err(|e| Error::Input(format!("invalid timeout {timeout_secs}: {e}")))?;
        Ok(Self {
            timeout,
            follow_redirects,
            verify_tls,
        })
    }
}

/// Everything the formatter needs from one response.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedResponse {
    pub protocol_version: String,
    pub status_code: u16,
    pub reason_phrase: String,
    /// Header pairs in the order they were received. Repeated names stay repeated.
    pub headers: Vec<(String, String)>,
    pub body_bytes: Vec<u8>,
    pub elapsed_seconds: f64,
}

impl CapturedResponse {
    /// All values of a header, joined with `", "`, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect();
        (!values.is_empty()).then(|| values.join(", "))
    }
}

/// Send one request and read the whole response.
pub fn execute(
    mut request: PreparedRequest,
    options: ExecuteOptions,
) -> Result<CapturedResponse, Error> {
    request.apply_content_type_hint();

    let method = Method::from_bytes(request.method.as_bytes())
        .map_err(|_| Error::Input(format!("invalid HTTP method: {:?}", request.method)))?;
    let url = Url::parse(&request.url)
        .map_err(|e| Error::Input(format!("invalid URL {:?}: {e}", request.url)))?;
    let headers = header_map(&request.headers)?;

    let client = build_client(options)?;
    let mut builder = client.request(method, url).headers(headers);
    if let Some(query) = request.query.as_ref() {
        let pairs: Vec<(&str, &str)> = query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        builder = builder.query(&pairs);
    }
    if let Some(body) = request.body.filter(|b| !b.is_empty()) {
        builder = builder.body(body);
    }

    debug!(method = %request.method, url = %request.url, "Sending request");
    let started = Instant::now();
    let response = builder.send().map_err(|e| Error::from_reqwest(&e))?;
    let captured = capture(response, started)?;
    debug!(
        status = captured.status_code,
        elapsed = captured.elapsed_seconds,
        size = captured.body_bytes.len(),
        "Received response"
    );
    Ok(captured)
}

fn build_client(options: ExecuteOptions) -> Result<Client, Error> {
    let policy = if options.follow_redirects {
        redirect::Policy::default()
    } else {
        redirect::Policy::none()
    };
    Client::builder()
        .timeout(options.timeout)
        .connect_timeout(options.timeout)
        .redirect(policy)
        .danger_accept_invalid_certs(!options.verify_tls)
        .danger_accept_invalid_hostnames(!options.verify_tls)
        .build()
        .map_err(|e| Error::from_reqwest(&e))
}

fn header_map(headers: &FieldMap) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::Input(format!("invalid header name: {name:?}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| Error::Input(format!("invalid value for header {name}: {value:?}")))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn capture(response: Response, started: Instant) -> Result<CapturedResponse, Error> {
    let status = response.status();
    let protocol_version = version_str(response.version()).to_owned();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().map_or_else(
                |_| String::from_utf8_lossy(value.as_bytes()).into_owned(),
                str::to_owned,
            );
            (name.as_str().to_owned(), value)
        })
        .collect();
    let body_bytes = response
        .bytes()
        .map_err(|e| Error::from_reqwest(&e))?
        .to_vec();

    Ok(CapturedResponse {
        protocol_version,
        status_code: status.as_u16(),
        reason_phrase: status.canonical_reason().unwrap_or_default().to_owned(),
        headers,
        body_bytes,
        elapsed_seconds: started.elapsed().as_secs_f64(),
    })
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&str, &str)], body: Option<&str>) -> PreparedRequest {
        PreparedRequest {
            method: "POST".to_owned(),
            url: "http://127.0.0.1/".to_owned(),
            query: None,
            headers: headers
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            body: body.map(|b| b.as_bytes().to_vec()),
            content_type_hint: Some("application/json".to_owned()),
        }
    }

    #[test]
    fn test_content_type_hint_applied_with_body() {
        let mut req = request(&[("Accept", "*/*")], Some("{}"));
        req.apply_content_type_hint();
        assert_eq!(req.headers["Content-Type"], "application/json");
    }

    #[test]
    fn test_content_type_hint_respects_existing_header() {
        let mut req = request(&[("content-TYPE", "text/plain")], Some("hi"));
        req.apply_content_type_hint();
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.headers["content-TYPE"], "text/plain");
    }

    #[test]
    fn test_content_type_hint_skipped_without_body() {
        let mut req = request(&[], None);
        req.apply_content_type_hint();
        assert!(req.headers.is_empty());

        let mut req = request(&[], Some(""));
        req.apply_content_type_hint();
        assert!(req.headers.is_empty());
    }

    #[test]
    fn test_content_type_hint_absent_on_raw_path() {
        let mut req = request(&[], Some("data"));
        req.content_type_hint = None;
        req.apply_content_type_hint();
        assert!(req.headers.is_empty());
    }

    #[test]
    fn test_invalid_timeout_is_input_error() {
        assert!(ExecuteOptions::new(-1.0, true, true).is_err());
        assert!(ExecuteOptions::new(f64::NAN, true, true).is_err());
        let options = ExecuteOptions::new(2.5, false, true).unwrap();
        assert_eq!(options.timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_invalid_inputs_fail_before_sending() {
        let mut req = request(&[], None);
        req.url = "/relative/only".to_owned();
        let options = ExecuteOptions::new(1.0, true, true).unwrap();
        let err = execute(req, options).unwrap_err();
        assert_eq!(err.kind(), "InputError");

        let mut req = request(&[("Bad Header", "x")], None);
        req.url = "http://127.0.0.1/".to_owned();
        assert_eq!(execute(req, options).unwrap_err().kind(), "InputError");

        let mut req = request(&[], None);
        req.method = "GE T".to_owned();
        assert_eq!(execute(req, options).unwrap_err().kind(), "InputError");
    }

    #[test]
    fn test_client_builds_for_every_policy() {
        for (follow_redirects, verify_tls) in [(true, true), (false, true), (true, false), (false, false)] {
            let options = ExecuteOptions::new(1.0, follow_redirects, verify_tls).unwrap();
            assert!(build_client(options).is_ok());
        }
    }

    #[test]
    fn test_header_lookup_joins_repeats() {
        let response = CapturedResponse {
            protocol_version: "1.1".to_owned(),
            status_code: 200,
            reason_phrase: "OK".to_owned(),
            headers: vec![
                ("set-cookie".to_owned(), "a=1".to_owned()),
                ("Content-Type".to_owned(), "text/plain".to_owned()),
                ("set-cookie".to_owned(), "b=2".to_owned()),
            ],
            body_bytes: Vec::new(),
            elapsed_seconds: 0.0,
        };
        assert_eq!(response.header("Set-Cookie").as_deref(), Some("a=1, b=2"));
        assert_eq!(response.header("content-type").as_deref(), Some("text/plain"));
        assert_eq!(response.header("x-missing"), None);
    }
}
