//! Built-in health-check controller.
//!
//! `Health/liveness` answers `ok` and `Health/readiness` answers `ready`,
//! both as plain text with status 200. They go through the normal dispatch
//! path, so a 200 also shows the router and controller table are working.
//!
//! Register the class and point routes at it:
//!
//! ```rust
//! use pico::{Controllers, Router, health::Health};
//!
//! let mut controllers = Controllers::new();
//! controllers.register::<Health>("Health");
//!
//! let mut router = Router::new();
//! router.get("/healthz", "Health/liveness").unwrap();
//! router.get("/readyz", "Health/readiness").unwrap();
//! ```
//!
//! Gate readiness on your own dependencies by registering a different
//! controller under `Health`.

use crate::context::Context;
use crate::controller::{Controller, Params};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct Health;

impl Controller for Health {
    fn call(&mut self, action: &str, ctx: &mut Context, _params: &Params) -> Option<Result<()>> {
        let body = match action {
            "liveness" => "ok",
            "readiness" => "ready",
            _ => return None,
        };
        ctx.response.text(body);
        Some(Ok(()))
    }
}
