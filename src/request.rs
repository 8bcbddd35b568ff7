//! Incoming HTTP request type.
//!
//! A [`Request`] is built fresh for every dispatch and dropped with it, so no
//! state leaks from one request into the next.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::upload::UploadedFile;

/// An incoming HTTP request.
#[derive(Clone, Debug, Default)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) query: HashMap<String, String>,
    pub(crate) form: HashMap<String, String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) files: HashMap<String, UploadedFile>,
    pub(crate) secure: bool,
    pub(crate) params: Vec<(String, String)>,
}

impl Request {
    /// Starts a request for `method` and `uri`. A query string on `uri` is
    /// split off and parsed.
    pub fn builder(method: &str, uri: &str) -> RequestBuilder {
        let (path, query) = match uri.split_once('?') {
            Some((path, qs)) => (path, parse_urlencoded(qs.as_bytes())),
            None => (uri, HashMap::new()),
        };
        RequestBuilder {
            req: Request {
                method: method.to_owned(),
                path: path.to_owned(),
                query,
                ..Request::default()
            },
        }
    }

    /// The method token as the client sent it; `GET` when none was sent.
    pub fn method(&self) -> &str {
        if self.method.is_empty() { "GET" } else { &self.method }
    }

    /// The URI path, without query string.
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn query_params(&self) -> &HashMap<String, String> { &self.query }
    pub fn post_data(&self) -> &HashMap<String, String> { &self.form }
    pub fn files(&self) -> &HashMap<String, UploadedFile> { &self.files }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn post(&self, key: &str) -> Option<&str> {
        self.form.get(key).map(String::as_str)
    }

    /// Looks in the form body first, then the query string.
    pub fn input(&self, key: &str) -> Option<&str> {
        self.post(key).or_else(|| self.query(key))
    }

    /// Case-insensitive header lookup. `-` and `_` are interchangeable, so
    /// `X-Requested-With` and `x_requested_with` name the same header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| header_eq(k, name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_ajax(&self) -> bool {
        self.header("X-Requested-With") == Some("XMLHttpRequest")
    }

    /// True when the request arrived over TLS, directly or at the proxy.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// True when `key` carries a successfully received file.
    pub fn has_file(&self, key: &str) -> bool {
        self.files.get(key).is_some_and(UploadedFile::is_ok)
    }

    /// The file uploaded under `key`.
    pub fn file(&self, key: &str) -> Result<&UploadedFile> {
        self.files
            .get(key)
            .filter(|f| f.is_ok())
            .ok_or_else(|| Error::FileNotUploaded(key.to_owned()))
    }

    /// Returns a named path parameter of the matched route.
    ///
    /// For a route `/users/:id`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `index`-th segment of the path with outer slashes trimmed:
    /// `/blog/7/edit` has `blog`, `7` and `edit` at 0, 1 and 2. Inner empty
    /// segments count, so `/a//b` has `""` at 1.
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.path.trim_matches('/').split('/').nth(index)
    }
}

fn header_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.bytes().zip(b.bytes()).all(|(x, y)| {
            let norm = |c: u8| if c == b'_' { b'-' } else { c.to_ascii_lowercase() };
            norm(x) == norm(y)
        })
}

pub(crate) fn parse_urlencoded(input: &[u8]) -> HashMap<String, String> {
    url::form_urlencoded::parse(input)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

// ── RequestBuilder ────────────────────────────────────────────────────────────

/// Fluent builder for [`Request`], used by transports and tests.
pub struct RequestBuilder {
    req: Request,
}

impl RequestBuilder {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.req.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.req.query.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn form(mut self, key: &str, value: &str) -> Self {
        self.req.form.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Sets the raw body. An `application/x-www-form-urlencoded` body is
    /// also decoded into the form fields, so add the content-type header
    /// first.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.req.body = body.into();
        let is_form = self.req.header("content-type")
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
        if is_form {
            self.req.form.extend(parse_urlencoded(&self.req.body));
        }
        self
    }

    pub fn file(mut self, field: &str, file: UploadedFile) -> Self {
        self.req.files.insert(field.to_owned(), file);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.req.secure = secure;
        self
    }

    pub fn build(self) -> Request {
        self.req
    }
}
