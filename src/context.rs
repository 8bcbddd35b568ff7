//! Per-dispatch request context.

use std::sync::Arc;

use crate::controller::Redirect;
use crate::error::Result;
use crate::middleware::{Flow, MiddlewareRegistry};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// Everything an action works with: the request, the response it writes, and
/// access to the shared middleware registry.
///
/// Created for one dispatch and dropped with it.
#[derive(Debug)]
pub struct Context {
    pub request: Request,
    pub response: Response,
    middleware: Arc<MiddlewareRegistry>,
}

impl Context {
    pub fn new(request: Request, middleware: Arc<MiddlewareRegistry>) -> Self {
        Self { request, response: Response::new(), middleware }
    }

    /// Runs the middleware registered under `alias` against this request.
    ///
    /// ```rust,ignore
    /// if ctx.middleware("auth")?.is_halt() {
    ///     return Ok(());
    /// }
    /// ```
    pub fn middleware(&mut self, alias: &str) -> Result<Flow> {
        self.middleware.invoke(alias, &mut self.request, &mut self.response)
    }

    /// Redirects to `location` and returns what was sent.
    pub fn redirect(&mut self, location: &str) -> Redirect {
        let _ = self.response.redirect(location);
        Redirect { status: Status::Found.code(), location: location.to_owned() }
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{Middleware, Next};

    #[derive(Default)]
    struct Stamp;

    impl Middleware for Stamp {
        fn handle(&self, req: &mut Request, res: &mut Response, next: Next) -> Flow {
            res.set_header("x-path", req.path());
            next.run(req)
        }
    }

    #[test]
    fn redirect_reports_status_and_location() {
        let mut ctx = Context::new(Request::default(), Arc::new(MiddlewareRegistry::new()));
        let redirect = ctx.redirect("/home");
        assert_eq!(redirect, Redirect { status: 302, location: "/home".into() });
        assert_eq!(ctx.response.header("location"), Some("/home"));
    }

    #[test]
    fn middleware_sees_this_request() {
        let mut registry = MiddlewareRegistry::new();
        registry.class::<Stamp>("Stamp").middleware("stamp", "Stamp").unwrap();

        let mut ctx = Context::new(Request::builder("GET", "/a/b").build(), Arc::new(registry));
        assert_eq!(ctx.middleware("stamp").unwrap(), Flow::Continue);
        assert_eq!(ctx.into_response().header("x-path"), Some("/a/b"));
    }
}
