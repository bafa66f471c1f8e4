//! Ordered request router.
//!
//! Routes are kept in registration order and scanned front to back. The first
//! route whose method and path template both match wins. There is no
//! specificity ranking: register `/users/me` before `/users/:id` if you want
//! it to take precedence.

use std::sync::Arc;

use tracing::debug;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::path::{PathMatch, PathMatcher};
use crate::query;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// One registered route: method, compiled path template, handler.
struct Route {
    method: Method,
    matcher: PathMatcher,
    handler: BoxedHandler,
}

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register a handler for a method + path template. Returns `self` for chaining.
    ///
    /// Path parameters use `:name` syntax and `req.param("name")` retrieves them:
    ///
    /// ```rust
    /// # use tabula::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get,  "/users/:id", get_user)
    ///     .on(Method::Post, "/users",     create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `template` is not a valid path template. Routes are
    /// registered at startup, so a bad template is a programming error.
    pub fn on(mut self, method: Method, template: &str, handler: impl Handler) -> Self {
        let matcher = PathMatcher::compile(template)
            .unwrap_or_else(|e| panic!("invalid route `{template}`: {e}"));
        self.routes.push(Route {
            method,
            matcher,
            handler: handler.into_boxed_handler(),
        });
        self
    }

    pub fn get(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, template, handler)
    }

    pub fn post(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, template, handler)
    }

    pub fn put(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, template, handler)
    }

    pub fn delete(self, template: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, template, handler)
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn lookup(&self, method: Method, target: &str) -> Option<(BoxedHandler, PathMatch)> {
        self.routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| {
                route
                    .matcher
                    .matches(target)
                    .map(|m| (Arc::clone(&route.handler), m))
            })
    }

    /// Routes one request and produces one response.
    ///
    /// Attaches the captured path parameters and the parsed query string to
    /// the request before calling the handler. No matching route yields
    /// `404 Not Found` with an empty body.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let Some((handler, matched)) = self.lookup(req.method, &req.target) else {
            debug!(method = %req.method, target = %req.target, "no route matched");
            return Response::status(Status::NotFound);
        };

        req.params = matched.params;
        req.query = matched.query.as_deref().map(query::parse).unwrap_or_default();

        let method = req.method;
        let path = req.path().to_owned();
        let response = handler.call(req).await;
        debug!(%method, %path, status = u16::from(response.status), "handled");
        response
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(target: &str) -> Request {
        Request::new(Method::Get, target, Vec::new(), "")
    }

    async fn echo_id(req: Request) -> Response {
        Response::text(req.param("id").unwrap_or("-").to_owned())
    }

    async fn echo_search(req: Request) -> Response {
        Response::text(req.query("search").unwrap_or("-").to_owned())
    }

    #[tokio::test]
    async fn first_registered_match_wins() {
        let router = Router::new()
            .get("/users/:id", |_req: Request| async { "param" })
            .get("/users/me", |_req: Request| async { "literal" });

        let res = router.dispatch(get("/users/me")).await;
        assert_eq!(res.body(), b"param");
    }

    #[tokio::test]
    async fn method_must_match() {
        let router = Router::new().post("/users", |_req: Request| async { Status::Created });

        let res = router.dispatch(get("/users")).await;
        assert_eq!(res.status_code(), Status::NotFound);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn params_and_query_reach_the_handler() {
        let router = Router::new()
            .get("/users/:id", echo_id)
            .get("/users", echo_search);

        let res = router.dispatch(get("/users/42")).await;
        assert_eq!(res.body(), b"42");

        let res = router.dispatch(get("/users?search=ann&search=bob")).await;
        assert_eq!(res.body(), b"bob");
    }

    #[tokio::test]
    async fn unmatched_path_is_404() {
        let router = Router::new().get("/users", echo_search);
        for target in ["/users/", "/nope", "/users/1/2"] {
            let res = router.dispatch(get(target)).await;
            assert_eq!(res.status_code(), Status::NotFound, "{target}");
        }
    }

    #[test]
    #[should_panic(expected = "invalid route `/users/:`")]
    fn bad_template_panics_at_registration() {
        let _ = Router::new().get("/users/:", echo_id);
    }
}
