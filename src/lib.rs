//! # pico
//!
//! A small MVC-style HTTP framework. Routes are regex templates, targets are
//! `"Controller/action"` strings, and middleware is something an action asks
//! for by name.
//!
//! ## How a request flows
//!
//! 1. The [`Router`] finds the first route registered for the method whose
//!    template matches the path (`/users/:id` captures `id`).
//! 2. The route's controller token is resolved through the alias table, and
//!    a fresh controller is built from the [`Controllers`] table.
//! 3. The controller runs the action with a per-request [`Context`]. The
//!    action may run named middleware through [`Context::middleware`].
//! 4. Any failure along the way is an [`Error`] that [`App::dispatch`] turns
//!    into a 404, 405 or 500 response.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use pico::{App, Config, Context, Controller, Controllers, Params, Result, Router, Server};
//!
//! #[derive(Default)]
//! struct HomeController;
//!
//! impl Controller for HomeController {
//!     fn call(&mut self, action: &str, ctx: &mut Context, params: &Params) -> Option<Result<()>> {
//!         match action {
//!             "home" => {
//!                 ctx.response.text(format!("home {}", params.at(0).unwrap_or_default()));
//!                 Some(Ok(()))
//!             }
//!             _ => None,
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut router = Router::new();
//!     router.alias([("HomeController", "Home")]);
//!     router.get("/home/:id", "Home/home")?;
//!
//!     let mut controllers = Controllers::new();
//!     controllers.register::<HomeController>("HomeController");
//!
//!     let config = Config::default();
//!     let server = Server::bind(&config.bind);
//!     server.serve(App::new(router, controllers, config)).await
//! }
//! ```

mod app;
mod config;
mod context;
mod controller;
mod error;
mod method;
mod pattern;
mod request;
mod response;
mod router;
mod server;
mod status;
mod upload;

pub mod health;
pub mod middleware;

pub use app::App;
pub use config::Config;
pub use context::Context;
pub use controller::{Controller, Controllers, Params, Redirect};
pub use error::{Error, Result};
pub use method::{Method, UnknownMethod};
pub use middleware::{Flow, Middleware, MiddlewareClass, MiddlewareRegistry, Next};
pub use pattern::Pattern;
pub use request::{Request, RequestBuilder};
pub use response::{ContentType, Response};
pub use router::{Route, RouteMatch, Router};
pub use server::Server;
pub use status::Status;
pub use upload::UploadedFile;
