//! Request dispatch and the error boundary.
//!
//! ```text
//! Request ─▶ Router::lookup ─▶ Controllers::create ─▶ Controller::call ─▶ Response
//!                 │                    │                     │
//!     MethodNotRegistered (405)  ControllerNotFound    ActionNotFound / action error
//!     NoRouteMatched (404)             (500)                 (500 or its own status)
//! ```
//!
//! Every failure comes back to [`App::dispatch`] as an [`Error`] value and is
//! rendered there: a plain-text diagnostic in debug mode, a static page in
//! production.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::config::Config;
use crate::context::Context;
use crate::controller::Controllers;
use crate::error::{Error, Result};
use crate::middleware::MiddlewareRegistry;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status;

/// A routed application: routes, controllers and configuration, frozen.
///
/// `App` is immutable after construction and shared across requests; each
/// [`dispatch`](Self::dispatch) gets its own [`Context`].
#[derive(Debug)]
pub struct App {
    router: Router,
    middleware: Arc<MiddlewareRegistry>,
    controllers: Controllers,
    config: Config,
}

impl App {
    pub fn new(router: Router, controllers: Controllers, config: Config) -> Self {
        let middleware = Arc::new(router.middleware.clone());
        Self { router, middleware, controllers, config }
    }

    pub fn router(&self) -> &Router { &self.router }

    /// The registry every dispatch shares.
    pub fn middleware(&self) -> &MiddlewareRegistry { &self.middleware }
    pub fn config(&self) -> &Config { &self.config }

    /// Dispatches one request and always produces a response.
    pub fn dispatch(&self, request: Request) -> Response {
        let method = request.method().to_owned();
        let path = request.path().to_owned();
        let mut ctx = Context::new(request, Arc::clone(&self.middleware));

        match self.try_dispatch(&mut ctx) {
            Ok(()) => {
                let res = ctx.into_response();
                debug!(%method, %path, status = res.status_code(), "dispatched");
                res
            }
            Err(e) => self.render_error(&method, &path, e),
        }
    }

    /// Matches, resolves and invokes. Errors raised by the action come back
    /// unchanged.
    pub fn try_dispatch(&self, ctx: &mut Context) -> Result<()> {
        let matched = self.router.lookup(ctx.request.method(), ctx.request.path())?;

        let mut controller = self
            .controllers
            .create(&matched.controller)
            .ok_or_else(|| Error::ControllerNotFound(matched.controller.clone()))?;

        ctx.request.params = matched.params.to_vec();
        controller
            .call(&matched.action, ctx, &matched.params)
            .ok_or_else(|| Error::ActionNotFound {
                controller: matched.controller.clone(),
                action: matched.action.clone(),
            })?
    }

    fn render_error(&self, method: &str, path: &str, e: Error) -> Response {
        let code = e.status().code();
        if code >= 500 {
            error!(%method, %path, status = code, error = %e, "dispatch failed");
        } else {
            warn!(%method, %path, status = code, error = %e, "dispatch failed");
        }

        let mut res = Response::new();
        res.set_status(code);
        if self.config.debug {
            res.text(e.to_string());
        } else if e.is_routing() {
            res.html(not_found_page(&self.config));
        } else {
            res.text(format!("{code} {}", status::reason(code)));
        }
        res
    }
}

fn not_found_page(config: &Config) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>404 Not Found</title>
</head>
<body>
    <h1>404</h1>
    <h2>Page Not Found</h2>
    <p>Sorry, the page you are looking for does not exist. The URL may be mistyped, or the page has been removed.</p>
    <p><a href="#" onclick="history.back(); return false;">Go back</a> · <a href="{home}">Home</a></p>
</body>
</html>
"##,
        home = config.base_url("")
    )
}
