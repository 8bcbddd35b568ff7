//! End-to-end dispatch through `App`, without a socket.

use std::sync::{Arc, Mutex};

use pico::{
    App, Config, Context, Controller, Controllers, Error, Flow, Middleware, MiddlewareClass, Next,
    Params, Request, Response, Result, Router, UploadedFile,
};

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// Records every action invocation as `Controller.action(args)`.
type Calls = Arc<Mutex<Vec<String>>>;

struct HomeController {
    calls: Calls,
}

impl HomeController {
    fn record(&self, entry: String) {
        self.calls.lock().unwrap().push(entry);
    }

    fn index(&mut self, ctx: &mut Context) -> Result<()> {
        if ctx.middleware("auth")?.is_halt() {
            return Ok(());
        }
        self.record("Home.index()".into());
        ctx.response.text("Welcome to the Home Page!");
        Ok(())
    }

    fn upload(&mut self, ctx: &mut Context) -> Result<()> {
        let dir = ctx.request.input("dir").unwrap_or_default().to_owned();
        let path = ctx.request.file("doc")?.store(&dir, None)?;
        ctx.response.success(path.display().to_string());
        Ok(())
    }
}

impl Controller for HomeController {
    fn call(&mut self, action: &str, ctx: &mut Context, params: &Params) -> Option<Result<()>> {
        match action {
            "index" => Some(self.index(ctx)),
            "home" => {
                let id = params.at(0).unwrap_or_default();
                self.record(format!("Home.home({id})"));
                ctx.response.text(id);
                Some(Ok(()))
            }
            "pair" => {
                let args: Vec<&str> = params.iter().map(|(_, v)| v).collect();
                self.record(format!("Home.pair({})", args.join(", ")));
                Some(Ok(()))
            }
            "param" => {
                ctx.response.text(ctx.request.param("slug").unwrap_or("-").to_owned());
                Some(Ok(()))
            }
            "upload" => Some(self.upload(ctx)),
            "leave" => {
                let redirect = ctx.redirect("/home");
                self.record(format!("redirect {} {}", redirect.status, redirect.location));
                Some(Ok(()))
            }
            _ => None,
        }
    }
}

#[derive(Default)]
struct Auth;

impl Middleware for Auth {
    fn handle(&self, req: &mut Request, res: &mut Response, next: Next) -> Flow {
        if req.header("authorization") == Some("Bearer ok") {
            next.run(req)
        } else {
            res.send(401, "Unauthorized")
        }
    }
}

#[derive(Default)]
struct NoHandle;

impl MiddlewareClass for NoHandle {
    fn handler(&self) -> Option<&dyn Middleware> {
        None
    }
}

fn app_with(debug: bool, auth_class: &str) -> (App, Calls) {
    let calls: Calls = Arc::default();

    let mut router = Router::new();
    router
        .middleware_mut()
        .class::<Auth>("AuthMiddleware")
        .class::<NoHandle>("NoHandleMiddleware");
    router.alias([("HomeController", "Home")]);
    router.get("/", "Home/index").unwrap().middleware("auth", auth_class).unwrap();
    router.get("/home/:id", "Home/home").unwrap();
    router.get("/pair/:a/:b", "Home/pair").unwrap();
    router.get("/posts/:slug", "Home/param").unwrap();
    router.get("/leave", "Home/leave").unwrap();
    router.post("/upload", "Home/upload").unwrap();

    let mut controllers = Controllers::new();
    let shared = Arc::clone(&calls);
    controllers.register_with("HomeController", move || HomeController { calls: Arc::clone(&shared) });

    let mut config = Config::default();
    config.debug = debug;
    (App::new(router, controllers, config), calls)
}

fn app() -> (App, Calls) {
    app_with(true, "AuthMiddleware")
}

fn body(res: &Response) -> String {
    String::from_utf8_lossy(res.body()).into_owned()
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

#[test]
fn get_home_7_invokes_home_with_7() {
    let (app, calls) = app();
    let res = app.dispatch(Request::builder("GET", "/home/7").build());

    assert_eq!(res.status_code(), 200);
    assert_eq!(body(&res), "7");
    assert_eq!(*calls.lock().unwrap(), ["Home.home(7)"]);
}

#[test]
fn trailing_slash_dispatches_identically() {
    let (app, calls) = app();
    app.dispatch(Request::builder("GET", "/home/7/").build());
    app.dispatch(Request::builder("get", "/home/7").build());
    assert_eq!(*calls.lock().unwrap(), ["Home.home(7)", "Home.home(7)"]);
}

#[test]
fn params_arrive_in_template_order() {
    let (app, calls) = app();
    app.dispatch(Request::builder("GET", "/pair/first/second").build());
    assert_eq!(*calls.lock().unwrap(), ["Home.pair(first, second)"]);
}

#[test]
fn request_exposes_route_params() {
    let (app, _) = app();
    let res = app.dispatch(Request::builder("GET", "/posts/hello-world").build());
    assert_eq!(body(&res), "hello-world");
}

#[test]
fn method_without_routes_is_405() {
    let (app, calls) = app();
    let res = app.dispatch(Request::builder("PUT", "/home/7").build());
    assert_eq!(res.status_code(), 405);
    assert!(calls.lock().unwrap().is_empty());

    let (app, _) = app_with(false, "AuthMiddleware");
    assert_eq!(app.dispatch(Request::builder("DELETE", "/home/7").build()).status_code(), 405);
}

#[test]
fn method_with_routes_but_no_match_is_404() {
    let (app, calls) = app();
    let res = app.dispatch(Request::builder("POST", "/home/7").build());
    assert_eq!(res.status_code(), 404);
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn unmatched_path_is_404() {
    let (app, _) = app();
    let res = app.dispatch(Request::builder("GET", "/home/7/edit").build());
    assert_eq!(res.status_code(), 404);
    assert!(body(&res).contains("/home/7/edit"));
}

#[test]
fn controller_redirect_returns_status_and_location() {
    let (app, calls) = app();
    let res = app.dispatch(Request::builder("GET", "/leave").build());
    assert_eq!(res.status_code(), 302);
    assert_eq!(res.header("location"), Some("/home"));
    assert_eq!(*calls.lock().unwrap(), ["redirect 302 /home"]);
}

// ── Middleware ────────────────────────────────────────────────────────────────

#[test]
fn middleware_halts_the_action() {
    let (app, calls) = app();
    let res = app.dispatch(Request::builder("GET", "/").build());

    assert_eq!(res.status_code(), 401);
    assert_eq!(body(&res), r#"{"message":"Unauthorized","status":401}"#);
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn middleware_lets_the_action_continue() {
    let (app, calls) = app();
    let res = app.dispatch(Request::builder("GET", "/").header("Authorization", "Bearer ok").build());

    assert_eq!(res.status_code(), 200);
    assert_eq!(body(&res), "Welcome to the Home Page!");
    assert_eq!(*calls.lock().unwrap(), ["Home.index()"]);
}

#[test]
fn middleware_without_handle_surfaces_as_500() {
    let (app, calls) = app_with(true, "NoHandleMiddleware");
    let res = app.dispatch(Request::builder("GET", "/").build());

    assert_eq!(res.status_code(), 500);
    assert_eq!(body(&res), "no handle method on middleware class: NoHandleMiddleware");
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn middleware_with_unknown_class_surfaces_as_500() {
    let (app, _) = app_with(true, "MissingMiddleware");
    let res = app.dispatch(Request::builder("GET", "/").build());
    assert_eq!(res.status_code(), 500);
    assert!(body(&res).starts_with("middleware class not found"));
}

#[test]
fn requests_do_not_share_state() {
    let (app, _) = app();
    let denied = app.dispatch(Request::builder("GET", "/").build());
    let allowed = app.dispatch(Request::builder("GET", "/").header("authorization", "Bearer ok").build());
    let denied_again = app.dispatch(Request::builder("GET", "/").build());

    assert_eq!(denied.status_code(), 401);
    assert_eq!(allowed.status_code(), 200);
    assert_eq!(denied_again.status_code(), 401);
}

// ── Uploads ───────────────────────────────────────────────────────────────────

#[test]
fn upload_is_stored_through_an_action() {
    let (app, _) = app();
    let dir = tempfile::tempdir().unwrap();
    let req = Request::builder("POST", "/upload")
        .form("dir", &dir.path().display().to_string())
        .file("doc", UploadedFile::new("test.txt", "text/plain", &b"hello"[..]))
        .build();

    let res = app.dispatch(req);
    assert_eq!(res.status_code(), 200);
    assert_eq!(std::fs::read(dir.path().join("test.txt")).unwrap(), b"hello");
}

#[test]
fn upload_failures_map_to_status() {
    let (app, _) = app();

    let res = app.dispatch(Request::builder("POST", "/upload").build());
    assert_eq!(res.status_code(), 400);

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("disk/uploads");
    let req = Request::builder("POST", "/upload")
        .form("dir", &missing.display().to_string())
        .file("doc", UploadedFile::new("test.txt", "text/plain", &b"hello"[..]))
        .build();
    let res = app.dispatch(req);
    assert_eq!(res.status_code(), 500);
    assert!(body(&res).starts_with("destination directory does not exist"));
}

// ── Router properties ─────────────────────────────────────────────────────────

#[test]
fn lookup_reports_method_before_path() {
    let mut router = Router::new();
    router.get("/users/:id", "Users/show").unwrap();

    assert!(matches!(router.lookup("POST", "/users/1"), Err(Error::MethodNotRegistered { .. })));
    assert!(matches!(router.lookup("POST", "/nothing"), Err(Error::MethodNotRegistered { .. })));
}
