//! Middleware registry and the single-hop handler protocol.
//!
//! Middleware in pico is *declared* globally and *applied* by the action that
//! wants it. Registration maps a short alias to a class name, and the class
//! name to a constructor:
//!
//! ```rust
//! use pico::{Flow, Middleware, Next, Request, Response, Router};
//!
//! #[derive(Default)]
//! struct Auth;
//!
//! impl Middleware for Auth {
//!     fn handle(&self, req: &mut Request, res: &mut Response, next: Next) -> Flow {
//!         if req.header("authorization").is_none() {
//!             return res.send(401, "Unauthorized");
//!         }
//!         next.run(req)
//!     }
//! }
//!
//! let mut router = Router::new();
//! router.middleware_mut().class::<Auth>("AuthMiddleware");
//! router.get("/", "Home/index").unwrap().middleware("auth", "AuthMiddleware").unwrap();
//! ```
//!
//! The `.middleware(..)` call after a route registration only adds the alias
//! to the shared registry; it does not bind it to that route. An action runs
//! it with [`Context::middleware`](crate::Context::middleware), once per call.
//! There is no automatic chain: each invocation is exactly one handler whose
//! `next` is a terminal continuation.

mod trace;

pub use trace::Trace;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::request::Request;
use crate::response::Response;

// ── Handler protocol ──────────────────────────────────────────────────────────

/// What a middleware decided.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    /// Carry on with the action.
    Continue,
    /// The response has been written; the action should return.
    Halt,
}

impl Flow {
    pub fn is_halt(self) -> bool {
        self == Flow::Halt
    }
}

/// The continuation handed to [`Middleware::handle`].
///
/// It ends the chain: running it leaves the request untouched and yields
/// [`Flow::Continue`].
#[derive(Debug)]
pub struct Next(());

impl Next {
    pub(crate) fn terminal() -> Self {
        Next(())
    }

    pub fn run(self, _req: &mut Request) -> Flow {
        Flow::Continue
    }
}

/// A middleware handler.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: &mut Request, res: &mut Response, next: Next) -> Flow;
}

/// A class that can be registered under a middleware class name.
///
/// Every [`Middleware`] is a class whose handler is itself. A type may also
/// implement this trait directly and return `None`; invoking it then fails
/// with [`Error::MiddlewareHandlerMissing`].
pub trait MiddlewareClass: Send + Sync + 'static {
    fn handler(&self) -> Option<&dyn Middleware>;
}

impl<M: Middleware> MiddlewareClass for M {
    fn handler(&self) -> Option<&dyn Middleware> {
        Some(self)
    }
}

type ClassFactory = Arc<dyn Fn() -> Box<dyn MiddlewareClass> + Send + Sync>;

// ── Registry ──────────────────────────────────────────────────────────────────

/// Alias → class name table plus the constructors the class names resolve to.
///
/// Built at startup (usually through [`Router`](crate::Router)) and shared
/// read-only across requests afterwards. Entries only accumulate or get
/// overwritten.
#[derive(Clone)]
pub struct MiddlewareRegistry {
    aliases: HashMap<String, String>,
    classes: HashMap<String, ClassFactory>,
}

impl MiddlewareRegistry {
    /// An empty registry with the built-in `Trace` class available.
    pub fn new() -> Self {
        let mut registry = Self { aliases: HashMap::new(), classes: HashMap::new() };
        registry.class::<Trace>("Trace");
        registry
    }

    /// Merges alias → class-name entries. Later entries overwrite earlier
    /// ones with the same alias.
    ///
    /// Both sides must be non-empty identifiers; on the first bad entry
    /// nothing is merged and [`Error::InvalidMiddlewareSpec`] is returned.
    pub fn add<I, A, C>(&mut self, entries: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (A, C)>,
        A: Into<String>,
        C: Into<String>,
    {
        let entries: Vec<(String, String)> = entries
            .into_iter()
            .map(|(a, c)| (a.into(), c.into()))
            .collect();

        if let Some((alias, class)) = entries.iter().find(|(a, c)| !is_identifier(a) || !is_identifier(c)) {
            return Err(Error::InvalidMiddlewareSpec { alias: alias.clone(), class: class.clone() });
        }
        for (alias, class) in entries {
            debug!(%alias, %class, "middleware registered");
            self.aliases.insert(alias, class);
        }
        Ok(self)
    }

    /// Single-entry form of [`add`](Self::add), for chaining after a route.
    pub fn middleware(&mut self, alias: &str, class: &str) -> Result<&mut Self> {
        self.add([(alias, class)])
    }

    /// Makes `name` resolvable, constructing `C::default()` per invocation.
    pub fn class<C: MiddlewareClass + Default>(&mut self, name: &str) -> &mut Self {
        self.classes.insert(name.to_owned(), Arc::new(|| Box::new(C::default()) as Box<dyn MiddlewareClass>));
        self
    }

    /// The alias → class-name table.
    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    pub fn is_registered(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }

    /// Runs the middleware registered under `alias` once.
    pub fn invoke(&self, alias: &str, req: &mut Request, res: &mut Response) -> Result<Flow> {
        let class = self
            .aliases
            .get(alias)
            .ok_or_else(|| Error::MiddlewareNotRegistered(alias.to_owned()))?;
        let factory = self
            .classes
            .get(class)
            .ok_or_else(|| Error::MiddlewareClassNotFound(class.clone()))?;

        let instance = factory();
        let handler = instance
            .handler()
            .ok_or_else(|| Error::MiddlewareHandlerMissing(class.clone()))?;

        let flow = handler.handle(req, res, Next::terminal());
        debug!(%alias, %class, ?flow, "middleware ran");
        Ok(flow)
    }
}

impl Default for MiddlewareRegistry {
    fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareRegistry")
            .field("aliases", &self.aliases)
            .field("classes", &self.classes.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Non-empty, no whitespace; `::`, `\`, `.` and `-` are allowed so
/// namespaced class names pass.
fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '\\'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Deny;

    impl Middleware for Deny {
        fn handle(&self, _req: &mut Request, res: &mut Response, _next: Next) -> Flow {
            res.send(403, "Forbidden")
        }
    }

    #[derive(Default)]
    struct Tag;

    impl Middleware for Tag {
        fn handle(&self, req: &mut Request, res: &mut Response, next: Next) -> Flow {
            res.set_header("x-tag", "seen");
            next.run(req)
        }
    }

    #[derive(Default)]
    struct Inert;

    impl MiddlewareClass for Inert {
        fn handler(&self) -> Option<&dyn Middleware> {
            None
        }
    }

    fn registry() -> MiddlewareRegistry {
        let mut r = MiddlewareRegistry::new();
        r.class::<Deny>("DenyMiddleware")
            .class::<Tag>("TagMiddleware")
            .class::<Inert>("AuthMiddleware");
        r
    }

    fn call(r: &MiddlewareRegistry, alias: &str) -> (Result<Flow>, Response) {
        let mut req = Request::builder("GET", "/").build();
        let mut res = Response::new();
        let out = r.invoke(alias, &mut req, &mut res);
        (out, res)
    }

    #[test]
    fn unknown_alias_is_not_registered() {
        let mut r = registry();
        r.add([("auth", "AuthMiddleware")]).unwrap();
        assert!(matches!(call(&r, "missing").0, Err(Error::MiddlewareNotRegistered(a)) if a == "missing"));
    }

    #[test]
    fn class_without_handle_is_reported() {
        let mut r = registry();
        r.add([("auth", "AuthMiddleware")]).unwrap();
        assert!(matches!(call(&r, "auth").0, Err(Error::MiddlewareHandlerMissing(c)) if c == "AuthMiddleware"));
    }

    #[test]
    fn unresolvable_class_is_reported() {
        let mut r = registry();
        r.middleware("ghost", "GhostMiddleware").unwrap();
        assert!(matches!(call(&r, "ghost").0, Err(Error::MiddlewareClassNotFound(c)) if c == "GhostMiddleware"));
    }

    #[test]
    fn handler_runs_once_with_the_request_and_response() {
        let mut r = registry();
        r.add([("deny", "DenyMiddleware"), ("tag", "TagMiddleware")]).unwrap();

        let (flow, res) = call(&r, "deny");
        assert_eq!(flow.unwrap(), Flow::Halt);
        assert_eq!(res.status_code(), 403);
        assert!(res.is_finished());

        let (flow, res) = call(&r, "tag");
        assert_eq!(flow.unwrap(), Flow::Continue);
        assert_eq!(res.header("x-tag"), Some("seen"));
        assert!(!res.is_finished());
    }

    #[test]
    fn later_registration_overwrites_alias() {
        let mut r = registry();
        r.middleware("gate", "DenyMiddleware").unwrap();
        r.middleware("gate", "TagMiddleware").unwrap();
        assert_eq!(r.aliases()["gate"], "TagMiddleware");
        assert_eq!(call(&r, "gate").0.unwrap(), Flow::Continue);
    }

    #[test]
    fn invalid_entries_are_rejected_without_partial_merge() {
        let mut r = registry();
        let err = r.add([("ok", "TagMiddleware"), ("", "DenyMiddleware")]).unwrap_err();
        assert!(matches!(err, Error::InvalidMiddlewareSpec { .. }));
        assert!(!r.is_registered("ok"));

        assert!(r.middleware("auth", "Auth Middleware").is_err());
        assert!(r.middleware("auth", r"App\Middleware\Auth").is_ok());
    }

    #[test]
    fn trace_is_available_out_of_the_box() {
        let mut r = MiddlewareRegistry::new();
        r.middleware("trace", "Trace").unwrap();
        assert_eq!(call(&r, "trace").0.unwrap(), Flow::Continue);
    }
}
