//! Text report for a captured response.

use encoding_rs::{Encoding, UTF_8};

use crate::executor::CapturedResponse;

/// Render a response as the fixed status / headers / body / info report.
#[must_use]
pub fn format_response(response: &CapturedResponse, include_headers: bool) -> String {
    let mut parts = vec![
        format!(
            "HTTP/{} {} {}",
            response.protocol_version, response.status_code, response.reason_phrase
        ),
        String::new(),
    ];

    if include_headers {
        parts.push("=== Response Headers ===".to_owned());
        parts.extend(
            response
                .headers
                .iter()
                .map(|(name, value)| format!("{name}: {value}")),
        );
        parts.push(String::new());
    }

    let content_type = response.header("content-type").unwrap_or_default();
    parts.push("=== Response Body ===".to_owned());
    parts.push(render_body(&response.body_bytes, &content_type));

    parts.push(String::new());
    parts.push("=== Request Info ===".to_owned());
    parts.push(format!("Time: {:.3}s", response.elapsed_seconds));
    parts.push(format!("Size: {} bytes", response.body_bytes.len()));

    parts.join("\n")
}

fn render_body(body: &[u8], content_type: &str) -> String {
    let text = decode_body(body, content_type);
    if !content_type.contains("application/json") {
        return text;
    }
    serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or(text)
}

/// Decode with the `charset=` from Content-Type, falling back to UTF-8. Invalid sequences
/// become U+FFFD.
fn decode_body(body: &[u8], content_type: &str) -> String {
    let encoding = charset(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _) = encoding.decode_with_bom_removal(body);
    text.into_owned()
}

fn charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}
