//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::method::Method;

/// An incoming HTTP request with its body fully buffered.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) target: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) query: HashMap<String, String>,
}

impl Request {
    /// Builds a request for `target` (a path with an optional `?query`).
    ///
    /// Path parameters and the parsed query are filled in by the
    /// [`Router`](crate::Router) when the request is dispatched.
    pub fn new(
        method: Method,
        target: impl Into<String>,
        headers: Vec<(String, String)>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            method,
            target: target.into(),
            headers,
            body: body.into(),
            params: HashMap::new(),
            query: HashMap::new(),
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn target(&self) -> &str { &self.target }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// The path without its query string.
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/:id`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a query-string value, as written (no percent-decoding).
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Parses the body as JSON.
    ///
    /// Lenient: an empty or malformed body is `None`, never an error. Handlers
    /// branch on the `None` themselves.
    pub fn json<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_slice(&self.body).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Named {
        name: String,
    }

    fn post(body: &'static str) -> Request {
        Request::new(
            Method::Post,
            "/users?x=1",
            vec![("Content-Type".into(), "application/json".into())],
            body,
        )
    }

    #[test]
    fn json_body_parses() {
        let named: Named = post(r#"{"name":"Ana"}"#).json().unwrap();
        assert_eq!(named.name, "Ana");
    }

    #[test]
    fn malformed_body_is_none() {
        assert!(post("{not json").json::<Named>().is_none());
        assert!(post("").json::<Named>().is_none());
    }

    #[test]
    fn path_drops_query() {
        let req = post("");
        assert_eq!(req.path(), "/users");
        assert_eq!(req.target(), "/users?x=1");
    }

    #[test]
    fn header_lookup_ignores_case() {
        assert_eq!(post("").header("content-type"), Some("application/json"));
        assert_eq!(post("").header("accept"), None);
    }
}
