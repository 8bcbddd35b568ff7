//! Minimal pico application: aliased controller, on-demand auth middleware,
//! JSON responses and health checks.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:8000/
//!   curl -H 'authorization: secret' http://localhost:8000/
//!   curl http://localhost:8000/home/7
//!   curl -X POST -d 'name=alice' http://localhost:8000/users
//!   curl -X POST http://localhost:8000/home/7      # 405
//!   curl http://localhost:8000/healthz

use pico::health::Health;
use pico::{
    App, Config, Context, Controller, Controllers, Flow, Middleware, Next, Params, Request, Response,
    Result, Router, Server,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let mut router = Router::new();
    router.middleware_mut().class::<Auth>("AuthMiddleware");
    router.alias([("HomeController", "Home")]);
    router.get("/", "Home/index")?.middleware("auth", "AuthMiddleware")?;
    router.get("/home/:id", "Home/home")?.middleware("trace", "Trace")?;
    router.post("/users", "Home/create")?;
    router.get("/healthz", "Health/liveness")?;
    router.get("/readyz", "Health/readiness")?;

    let mut controllers = Controllers::new();
    controllers
        .register::<HomeController>("HomeController")
        .register::<Health>("Health");

    let server = Server::bind(&config.bind);
    server.serve(App::new(router, controllers, config)).await
}

// ── Middleware ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Auth;

impl Middleware for Auth {
    fn handle(&self, req: &mut Request, res: &mut Response, next: Next) -> Flow {
        match req.header("authorization") {
            Some("secret") => next.run(req),
            _ => res.send(401, "Unauthorized"),
        }
    }
}

// ── Controller ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct HomeController;

impl HomeController {
    // GET /
    fn index(&mut self, ctx: &mut Context) -> Result<()> {
        if ctx.middleware("auth")?.is_halt() {
            return Ok(());
        }
        ctx.response.text("Welcome to the Home Page!");
        Ok(())
    }

    // GET /home/:id
    fn home(&mut self, ctx: &mut Context, id: &str) -> Result<()> {
        ctx.middleware("trace")?;
        ctx.response.text(id);
        Ok(())
    }

    // POST /users
    fn create(&mut self, ctx: &mut Context) -> Result<()> {
        let Some(name) = ctx.request.post("name").map(str::to_owned) else {
            ctx.response.send(422, "name is required");
            return Ok(());
        };
        ctx.response.json(serde_json::json!({ "id": 99, "name": name }), 201);
        Ok(())
    }
}

impl Controller for HomeController {
    fn call(&mut self, action: &str, ctx: &mut Context, params: &Params) -> Option<Result<()>> {
        match action {
            "index" => Some(self.index(ctx)),
            "home" => Some(self.home(ctx, params.at(0).unwrap_or_default())),
            "create" => Some(self.create(ctx)),
            _ => None,
        }
    }
}
