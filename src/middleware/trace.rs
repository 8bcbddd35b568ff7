use tracing::info;

use super::{Flow, Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Logs the request it is invoked on and continues.
#[derive(Debug, Default)]
pub struct Trace;

impl Middleware for Trace {
    fn handle(&self, req: &mut Request, _res: &mut Response, next: Next) -> Flow {
        info!(
            method = req.method(),
            path = req.path(),
            ajax = req.is_ajax(),
            secure = req.is_secure(),
            "request"
        );
        next.run(req)
    }
}
