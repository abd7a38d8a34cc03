//! The `http_request` and `http_raw` tools.
//!
//! Decodes call arguments, runs the request, and turns the outcome into the result text. A
//! tool call never fails outward: errors come back as `Error: <Kind>: <message>`.

use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::Error;
use crate::executor::{ExecuteOptions, PreparedRequest, execute};
use crate::format::format_response;
use crate::http::{HeaderInput, ParamInput, normalize_headers, normalize_params, parse_raw_request};

const RAW_TIMEOUT_SECS: f64 = 30.0;

const HTTP_REQUEST_DESCRIPTION: &str = "Send an HTTP request to a URL. Supports GET/POST/PUT/DELETE/PATCH/HEAD/OPTIONS.

Usage examples:
- GET request: method=\"GET\", url=\"https://api.example.com/users\"
- GET with params: method=\"GET\", url=\"...\", params='{\"page\":\"1\",\"size\":\"10\"}'
- POST JSON: method=\"POST\", url=\"...\", body='{\"key\":\"value\"}'
- PUT update: method=\"PUT\", url=\"...\", body='{\"id\":1,\"name\":\"test\"}'
- DELETE: method=\"DELETE\", url=\"https://api.example.com/users/1\"
- Custom headers: headers='{\"Authorization\":\"Bearer xxx\"}'
- Form submit: body=\"name=test&age=18\", content_type=\"application/x-www-form-urlencoded\"";

const HTTP_RAW_DESCRIPTION: &str = "Send a raw HTTP request, e.g. one copied from Burp Suite or another intercepting proxy.

Format example:
POST /api/login HTTP/1.1
Host: example.com
Content-Type: application/json

{\"username\":\"admin\",\"password\":\"123456\"}

The target URL is taken from the request line when it is absolute, otherwise from base_url, otherwise from the Host header.";

fn default_method() -> String {
    "GET".to_owned()
}

fn default_content_type() -> String {
    "application/json".to_owned()
}

fn default_timeout() -> f64 {
    30.0
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct HttpRequestArgs {
    #[serde(default = "default_method")]
    method: String,
    url: String,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    headers: Option<Value>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default = "default_content_type")]
    content_type: String,
    #[serde(default = "default_timeout")]
    timeout: f64,
    #[serde(default = "default_true")]
    follow_redirects: bool,
    #[serde(default = "default_true")]
    verify_ssl: bool,
    #[serde(default = "default_true")]
    include_headers: bool,
}

#[derive(Debug, Deserialize)]
struct HttpRawArgs {
    raw_request: String,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default = "default_true")]
    verify_ssl: bool,
}

/// Tools offered by this server.
#[must_use]
pub fn list_tools() -> Vec<Tool> {
    vec![
        Tool::new(
            "http_request",
            HTTP_REQUEST_DESCRIPTION,
            schema(&json!({
                "type": "object",
                "properties": {
                    "method": {
                        "type": "string",
                        "description": "HTTP method: GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS",
                        "enum": ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"],
                        "default": "GET"
                    },
                    "url": {
                        "type": "string",
                        "description": "Request URL, e.g. https://api.example.com/users"
                    },
                    "params": {
                        "type": "string",
                        "description": "URL query parameters as JSON ('{\"key\":\"value\"}') or key=value&key2=value2"
                    },
                    "headers": {
                        "type": "string",
                        "description": "Request headers as a JSON object or one 'Key: Value' per line"
                    },
                    "body": {
                        "type": "string",
                        "description": "Request body (JSON string or other text)"
                    },
                    "content_type": {
                        "type": "string",
                        "description": "Content-Type used when a body is sent without one",
                        "default": "application/json"
                    },
                    "timeout": {
                        "type": "number",
                        "description": "Timeout in seconds",
                        "default": 30
                    },
                    "follow_redirects": {
                        "type": "boolean",
                        "description": "Whether to follow redirects",
                        "default": true
                    },
                    "verify_ssl": {
                        "type": "boolean",
                        "description": "Whether to verify the TLS certificate",
                        "default": true
                    },
                    "include_headers": {
                        "type": "boolean",
                        "description": "Whether to include response headers in the output",
                        "default": true
                    }
                },
                "required": ["url"]
            })),
        ),
        Tool::new(
            "http_raw",
            HTTP_RAW_DESCRIPTION,
            schema(&json!({
                "type": "object",
                "properties": {
                    "raw_request": {
                        "type": "string",
                        "description": "Raw HTTP request text (request line, headers, blank line, body)"
                    },
                    "base_url": {
                        "type": "string",
                        "description": "Base URL if the request line carries only a path, e.g. https://example.com"
                    },
                    "verify_ssl": {
                        "type": "boolean",
                        "description": "Whether to verify the TLS certificate",
                        "default": true
                    }
                },
                "required": ["raw_request"]
            })),
        ),
    ]
}

fn schema(value: &Value) -> Arc<JsonObject> {
    Arc::new(value.as_object().cloned().unwrap_or_else(JsonObject::new))
}

/// Run a tool by name and return the text of its result. Blocks on the network call.
#[must_use]
pub fn call_tool(name: &str, arguments: Value) -> String {
    let result = match name {
        "http_request" => handle_http_request(arguments),
        "http_raw" => handle_http_raw(arguments),
        _ => {
            warn!(tool = name, "Unknown tool requested");
            return format!("Unknown tool: {name}");
        }
    };

    result.unwrap_or_else(|e| {
        warn!(tool = name, error = %e, "Tool call failed");
        format!("Error: {e}")
    })
}

fn decode_args<T: DeserializeOwned>(arguments: Value) -> Result<T, Error> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| Error::Input(e.to_string()))
}

fn handle_http_request(arguments: Value) -> Result<String, Error> {
    let args: HttpRequestArgs = decode_args(arguments)?;
    if args.url.trim().is_empty() {
        return Err(Error::Input("url must not be empty".to_owned()));
    }

    let request = PreparedRequest {
        method: args.method.to_uppercase(),
        url: args.url,
        query: normalize_params(ParamInput::from(args.params)),
        headers: normalize_headers(HeaderInput::from(args.headers)),
        body: args.body.map(String::into_bytes),
        content_type_hint: Some(args.content_type),
    };
    let options = ExecuteOptions::new(args.timeout, args.follow_redirects, args.verify_ssl)?;

    info!(method = %request.method, url = %request.url, "http_request");
    let response = execute(request, options)?;
    Ok(format_response(&response, args.include_headers))
}

fn handle_http_raw(arguments: Value) -> Result<String, Error> {
    let args: HttpRawArgs = decode_args(arguments)?;
    let raw = parse_raw_request(&args.raw_request, args.base_url.as_deref());

    let request = PreparedRequest {
        method: raw.method,
        url: raw.url,
        query: None,
        headers: raw.headers,
        body: raw.body.map(String::into_bytes),
        content_type_hint: None,
    };
    let options = ExecuteOptions::new(RAW_TIMEOUT_SECS, true, args.verify_ssl)?;

    info!(method = %request.method, url = %request.url, "http_raw");
    let response = execute(request, options)?;
    Ok(format_response(&response, true))
}
