//! Outgoing HTTP response type.
//!
//! Every dispatch owns exactly one [`Response`]. Actions and middleware write
//! into it; the writers that "terminate" (send a JSON envelope, redirect)
//! mark it finished and return [`Flow::Halt`] so the caller can bail out.

use bytes::Bytes;
use http_body_util::Full;
use serde::Serialize;
use serde_json::json;

use crate::middleware::Flow;
use crate::status::{self, Status};

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`Response::bytes`].
#[derive(Clone, Copy, Debug)]
pub enum ContentType {
    Html,        // text/html; charset=utf-8
    Json,        // application/json
    OctetStream, // application/octet-stream
    Text,        // text/plain; charset=utf-8
}

impl ContentType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response. Starts as `200 OK` with an empty body.
///
/// ```rust
/// use pico::{Flow, Response};
///
/// let mut res = Response::new();
/// let flow = res.send(404, "no such user");
/// assert_eq!(flow, Flow::Halt);
/// assert_eq!(res.body(), br#"{"message":"no such user","status":404}"#);
/// ```
#[derive(Clone, Debug)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    finished: bool,
}

impl Response {
    pub fn new() -> Self {
        Self { status: Status::Ok.code(), headers: Vec::new(), body: Vec::new(), finished: false }
    }

    pub fn status_code(&self) -> u16 { self.status }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// True once a terminating writer ran.
    pub fn is_finished(&self) -> bool { self.finished }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_status(&mut self, code: u16) -> &mut Self {
        self.status = code;
        self
    }

    /// Sets a header, replacing any existing value under the same name.
    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_ascii_lowercase(), value.to_owned()));
        self
    }

    /// Replaces the body with plain text.
    pub fn text(&mut self, body: impl Into<String>) -> &mut Self {
        self.bytes(ContentType::Text, body.into().into_bytes())
    }

    /// Replaces the body with HTML.
    pub fn html(&mut self, body: impl Into<String>) -> &mut Self {
        self.bytes(ContentType::Html, body.into().into_bytes())
    }

    /// Replaces the body with bytes of the given type.
    pub fn bytes(&mut self, content_type: ContentType, body: Vec<u8>) -> &mut Self {
        self.body = body;
        self.set_header("content-type", content_type.as_str())
    }

    // ── Terminating writers ──────────────────────────────────────────────────

    /// `{"status": <code>, "message": <message>}` with the given status.
    pub fn send(&mut self, code: u16, message: impl Serialize) -> Flow {
        self.json(json!({ "status": code, "message": message }), code)
    }

    /// Serializes `data` as the body with the given status.
    pub fn json(&mut self, data: impl Serialize, code: u16) -> Flow {
        match serde_json::to_vec(&data) {
            Ok(body) => {
                self.status = code;
                self.bytes(ContentType::Json, body);
            }
            Err(e) => {
                let code = Status::InternalServerError.code();
                self.status = code;
                let body = json!({ "status": code, "message": e.to_string() }).to_string();
                self.bytes(ContentType::Json, body.into_bytes());
            }
        }
        self.finish()
    }

    /// `200` with `{"status": 200, "message": {"data": <data>}}`.
    pub fn success(&mut self, data: impl Serialize) -> Flow {
        self.send(Status::Ok.code(), json!({ "data": data }))
    }

    /// `500` with `{"status": 500, "message": {"error": <message>}}`.
    pub fn error(&mut self, message: impl Serialize) -> Flow {
        self.send(Status::InternalServerError.code(), json!({ "error": message }))
    }

    /// `302 Found` to `location`, empty body.
    pub fn redirect(&mut self, location: &str) -> Flow {
        self.status = Status::Found.code();
        self.body.clear();
        self.set_header("location", location);
        self.finish()
    }

    fn finish(&mut self) -> Flow {
        self.finished = true;
        Flow::Halt
    }

    /// The status line reason phrase, e.g. `"Not Found"`.
    pub fn reason(&self) -> &'static str {
        status::reason(self.status)
    }

    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|_| {
                let mut res = http::Response::new(Full::new(Bytes::new()));
                *res.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
                res
            })
    }
}

impl Default for Response {
    fn default() -> Self { Self::new() }
}
