//! Controllers and the name → constructor table they resolve through.
//!
//! A route target names a controller class and an action by string
//! (`"Home/home"`). At startup every controller class is registered under its
//! name with a no-argument constructor; at dispatch a fresh instance is built
//! and asked to run the action.
//!
//! ```rust
//! use pico::{Context, Controller, Controllers, Params, Result};
//!
//! #[derive(Default)]
//! struct HomeController;
//!
//! impl HomeController {
//!     fn home(&mut self, ctx: &mut Context, id: &str) -> Result<()> {
//!         ctx.response.text(id);
//!         Ok(())
//!     }
//! }
//!
//! impl Controller for HomeController {
//!     fn call(&mut self, action: &str, ctx: &mut Context, params: &Params) -> Option<Result<()>> {
//!         match action {
//!             "home" => Some(self.home(ctx, params.at(0).unwrap_or_default())),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut controllers = Controllers::new();
//! controllers.register::<HomeController>("HomeController");
//! assert!(controllers.contains("HomeController"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;

/// A controller class.
pub trait Controller: Send + 'static {
    /// Runs `action`. Returns `None` when the controller has no such action.
    ///
    /// `params` carries the route's placeholders in template order.
    fn call(&mut self, action: &str, ctx: &mut Context, params: &Params) -> Option<Result<()>>;
}

// ── Params ────────────────────────────────────────────────────────────────────

/// Path parameters of a matched route, in the order they appear in the
/// template.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// The value of the `index`-th placeholder.
    pub fn at(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn to_vec(&self) -> Vec<(String, String)> {
        self.0.clone()
    }
}

// ── Controllers ───────────────────────────────────────────────────────────────

type Factory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// Controller class table, built at startup and read-only afterwards.
#[derive(Clone, Default)]
pub struct Controllers {
    factories: HashMap<String, Factory>,
}

impl Controllers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `C` under `name`, constructed with `C::default()` per request.
    pub fn register<C: Controller + Default>(&mut self, name: &str) -> &mut Self {
        self.register_with(name, C::default)
    }

    /// Registers a custom constructor under `name`.
    pub fn register_with<C, F>(&mut self, name: &str, make: F) -> &mut Self
    where
        C: Controller,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.factories.insert(name.to_owned(), Arc::new(move || Box::new(make()) as Box<dyn Controller>));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// A fresh instance of the class registered under `name`.
    pub fn create(&self, name: &str) -> Option<Box<dyn Controller>> {
        self.factories.get(name).map(|make| make())
    }
}

impl std::fmt::Debug for Controllers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

/// The redirect a controller issued: what a test harness observes instead of
/// a real `Location` round trip.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redirect {
    pub status: u16,
    pub location: String,
}
