//! Regex route table.
//!
//! One ordered list of routes per HTTP method. Lookup walks the list in
//! registration order and the first pattern that matches wins, so overlapping
//! routes are resolved by the order you register them in:
//!
//! ```rust
//! use pico::Router;
//!
//! let mut router = Router::new();
//! router.get("/users/new", "Users/create").unwrap();
//! router.get("/users/:id", "Users/show").unwrap();
//!
//! assert_eq!(router.lookup("GET", "/users/new").unwrap().action, "create");
//! assert_eq!(router.lookup("get", "/users/42/").unwrap().params.get("id"), Some("42"));
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::controller::Params;
use crate::error::{Error, Result};
use crate::method::Method;
use crate::middleware::MiddlewareRegistry;
use crate::pattern::{Pattern, strip_trailing_slash};

/// A registered route.
#[derive(Clone, Debug)]
pub struct Route {
    pub method: Method,
    pub pattern: Pattern,
    pub controller: String,
    pub action: String,
}

/// The outcome of a successful [`Router::lookup`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteMatch {
    /// Controller class name, after alias resolution.
    pub controller: String,
    pub action: String,
    pub params: Params,
}

/// The application router.
///
/// Build it once at startup. Every registration returns the shared
/// [`MiddlewareRegistry`] so an alias can be declared on the same line:
///
/// ```rust
/// # use pico::Router;
/// let mut router = Router::new();
/// router.get("/", "Home/index").unwrap().middleware("trace", "Trace").unwrap();
/// ```
///
/// That declaration is global; the route itself carries no middleware.
#[derive(Debug, Default)]
pub struct Router {
    routes: HashMap<Method, Vec<Route>>,
    aliases: Vec<(String, String)>,
    pub(crate) middleware: MiddlewareRegistry,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `target` (`"Controller/action"`) for `method` + `template`.
    pub fn add(&mut self, method: Method, template: &str, target: &str) -> Result<&mut MiddlewareRegistry> {
        let (controller, action) = target
            .split_once('/')
            .filter(|(c, a)| !c.is_empty() && !a.is_empty())
            .ok_or_else(|| Error::InvalidRouteTemplate {
                template: template.to_owned(),
                reason: format!("target `{target}` is not `Controller/action`"),
            })?;
        let pattern = Pattern::compile(template)?;

        debug!(%method, pattern = pattern.raw(), %target, "route registered");
        self.routes.entry(method).or_default().push(Route {
            method,
            pattern,
            controller: controller.to_owned(),
            action: action.to_owned(),
        });
        Ok(&mut self.middleware)
    }

    /// Registers the same route for each of `methods`.
    pub fn on(&mut self, methods: &[Method], template: &str, target: &str) -> Result<&mut MiddlewareRegistry> {
        for &method in methods {
            self.add(method, template, target)?;
        }
        Ok(&mut self.middleware)
    }

    pub fn get(&mut self, template: &str, target: &str) -> Result<&mut MiddlewareRegistry> {
        self.add(Method::Get, template, target)
    }

    pub fn post(&mut self, template: &str, target: &str) -> Result<&mut MiddlewareRegistry> {
        self.add(Method::Post, template, target)
    }

    pub fn put(&mut self, template: &str, target: &str) -> Result<&mut MiddlewareRegistry> {
        self.add(Method::Put, template, target)
    }

    pub fn delete(&mut self, template: &str, target: &str) -> Result<&mut MiddlewareRegistry> {
        self.add(Method::Delete, template, target)
    }

    /// GET, POST, PUT and DELETE.
    pub fn any(&mut self, template: &str, target: &str) -> Result<&mut MiddlewareRegistry> {
        self.on(&Method::ANY, template, target)
    }

    /// Merges alias → controller-class entries; a repeated alias keeps its
    /// position and takes the new value.
    pub fn alias<I, A, C>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: Into<String>,
        C: Into<String>,
    {
        for (alias, real) in entries {
            let (alias, real) = (alias.into(), real.into());
            match self.aliases.iter_mut().find(|(a, _)| *a == alias) {
                Some(entry) => entry.1 = real,
                None => self.aliases.push((alias, real)),
            }
        }
        self
    }

    pub fn aliases(&self) -> &[(String, String)] {
        &self.aliases
    }

    /// The class a route's controller token dispatches to.
    ///
    /// The alias table is searched by *value*: when `token` is the target of
    /// an alias, the alias key is the class name. Otherwise `token` is used
    /// as is. With `{"HomeController": "Home"}`, routes written against
    /// `Home` dispatch to `HomeController`.
    pub fn resolve_controller<'a>(&'a self, token: &'a str) -> &'a str {
        self.aliases
            .iter()
            .find(|(_, real)| real == token)
            .map_or(token, |(alias, _)| alias.as_str())
    }

    /// Registered routes, by method.
    pub fn routes(&self) -> &HashMap<Method, Vec<Route>> {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn middleware(&self) -> &MiddlewareRegistry {
        &self.middleware
    }

    pub fn middleware_mut(&mut self) -> &mut MiddlewareRegistry {
        &mut self.middleware
    }

    /// Finds the first route for `method` matching `path`.
    ///
    /// A method with no routes at all is [`Error::MethodNotRegistered`]; a
    /// method whose routes all miss is [`Error::NoRouteMatched`].
    pub fn lookup(&self, method: &str, path: &str) -> Result<RouteMatch> {
        let path = strip_trailing_slash(path);
        let routes = method
            .parse::<Method>()
            .ok()
            .and_then(|m| self.routes.get(&m))
            .ok_or_else(|| Error::MethodNotRegistered {
                method: method.to_ascii_uppercase(),
                path: path.to_owned(),
            })?;

        routes
            .iter()
            .find_map(|route| {
                let params = route.pattern.captures(path)?;
                Some(RouteMatch {
                    controller: self.resolve_controller(&route.controller).to_owned(),
                    action: route.action.clone(),
                    params: Params::new(params),
                })
            })
            .ok_or_else(|| Error::NoRouteMatched { path: path.to_owned() })
    }
}
