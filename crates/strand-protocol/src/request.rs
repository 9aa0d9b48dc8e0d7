use std::fmt;

use serde::Serialize;
use serde_json::Value;
use strand_types::encoding::encode_step;
use strand_types::{HumanReadable, SearchBounds};

use crate::endpoint::endpoints;
use crate::error::{ProtocolError, ProtocolResult};

/// Request method: a fetch, a mutation, or a removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request against the remote store, relative to the store root.
///
/// Segments are stored percent-encoded; [`Request::path`] joins them with `/`.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl Request {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            segments: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    pub fn post() -> Self {
        Self::new(Method::Post)
    }

    pub fn delete() -> Self {
        Self::new(Method::Delete)
    }

    /// Append already-encoded prefix segments, such as a branch path.
    pub fn at(mut self, prefix: &[String]) -> Self {
        self.segments.extend(prefix.iter().filter(|s| !s.is_empty()).cloned());
        self
    }

    /// Append one raw segment, percent-encoding it.
    pub fn segment(mut self, raw: &str) -> Self {
        self.segments.push(encode_step(raw));
        self
    }

    /// Append a hash or tag as a single segment.
    pub fn param<T: HumanReadable>(self, value: &T) -> Self {
        self.segment(&value.to_human())
    }

    /// Append a key in its canonical form. The key's own `/` separators are
    /// kept, so a multi-step key spans several segments. The root key adds
    /// nothing.
    pub fn key<K: HumanReadable>(mut self, key: &K) -> Self {
        let encoded = key.to_human();
        if !encoded.is_empty() {
            self.segments.push(encoded);
        }
        self
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn query_opt<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(name, v),
            None => self,
        }
    }

    /// Add the `depth` and `n` parameters of a bounded graph walk.
    pub fn bounds(self, bounds: &SearchBounds) -> Self {
        self.query_opt(endpoints::DEPTH, bounds.max_depth)
            .query_opt(endpoints::LIMIT, bounds.limit)
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn json_body<T: Serialize + ?Sized>(self, body: &T) -> ProtocolResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| ProtocolError::Encode(e.to_string()))?;
        Ok(self.body(value))
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The `/`-joined encoded path, without a leading slash.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// First value of a query parameter.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn body_value(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<Value> {
        self.body
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} /{}", self.method, self.path())?;
        for (i, (k, v)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{k}={v}")?;
        }
        Ok(())
    }
}
