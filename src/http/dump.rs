//! Raw request dump for failed requests.
//!
//! The lifecycle middleware snapshots the request head before handing the
//! request downstream; if the request ends up with recorded errors the
//! snapshot is rendered as wire-like text and logged alongside them.

use axum::body::Bytes;
use axum::http::header::HOST;
use axum::http::{HeaderMap, Method, Version};

/// What was captured of the request body.
#[derive(Debug, Clone)]
pub enum BodyCapture {
    /// Body dumping disabled.
    Skipped,
    /// Buffered body bytes.
    Captured(Bytes),
    /// Body size unknown or over the buffering limit; passed through as is.
    NotCaptured,
    /// Reading the body failed.
    Unreadable(String),
}

/// Request head (and optionally body) as received.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub method: Method,
    pub path: String,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: BodyCapture,
}

/// HTTP version marker as written after `HTTP/`.
pub fn version_marker(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
///
/// `x-request-id` becomes `X-Request-Id`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

impl RequestSnapshot {
    /// Render as `METHOD path HTTP/x` followed by the headers, `Host` first.
    pub fn render(&self) -> String {
        let mut dump = format!(
            "{} {} HTTP/{}\r\n",
            self.method,
            self.path,
            version_marker(self.version)
        );

        let host = self
            .headers
            .get(HOST)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default();
        dump.push_str(&format!("Host: {}\r\n", host));

        for (name, value) in self.headers.iter() {
            if *name == HOST {
                continue;
            }
            dump.push_str(&format!(
                "{}: {}\r\n",
                title_case(name.as_str()),
                String::from_utf8_lossy(value.as_bytes())
            ));
        }

        match &self.body {
            BodyCapture::Skipped => {}
            BodyCapture::Captured(bytes) => {
                dump.push_str(&String::from_utf8_lossy(bytes));
                dump.push_str("\r\n");
            }
            BodyCapture::NotCaptured => dump.push_str("<body not captured>\r\n"),
            BodyCapture::Unreadable(reason) => {
                dump.push_str(&format!("<body unreadable: {}>\r\n", reason));
            }
        }

        dump
    }
}
