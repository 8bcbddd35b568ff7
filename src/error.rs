//! Unified error type.

use std::path::PathBuf;

use crate::status::Status;

/// The error type returned by pico's fallible operations.
///
/// Routing, controller resolution and middleware failures are terminal for
/// the current request. They travel back up the call chain as values and are
/// translated into an HTTP response in exactly one place, [`App::dispatch`].
///
/// [`App::dispatch`]: crate::App::dispatch
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid route `{template}`: {reason}")]
    InvalidRouteTemplate { template: String, reason: String },

    #[error("method {method} is not allowed for URI '{path}'")]
    MethodNotRegistered { method: String, path: String },

    #[error("404 Not Found: the requested URL '{path}' does not exist on this server")]
    NoRouteMatched { path: String },

    #[error("controller not found: {0}")]
    ControllerNotFound(String),

    #[error("action `{action}` not found on controller {controller}")]
    ActionNotFound { controller: String, action: String },

    #[error("invalid middleware entry `{alias}` => `{class}`: alias and class must be non-empty identifiers")]
    InvalidMiddlewareSpec { alias: String, class: String },

    #[error("middleware not registered: {0}")]
    MiddlewareNotRegistered(String),

    #[error("middleware class not found: {0}")]
    MiddlewareClassNotFound(String),

    #[error("no handle method on middleware class: {0}")]
    MiddlewareHandlerMissing(String),

    #[error("file with key '{0}' was not found or was not uploaded correctly")]
    FileNotUploaded(String),

    #[error("invalid upload file name: '{0}'")]
    InvalidFileName(String),

    #[error("destination directory does not exist: {}", .0.display())]
    DestinationMissing(PathBuf),

    #[error("destination directory is not writable: {}", .0.display())]
    DestinationNotWritable(PathBuf),

    #[error("config: {0}")]
    Config(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The HTTP status this failure maps to at the error boundary.
    pub fn status(&self) -> Status {
        match self {
            Self::MethodNotRegistered { .. } => Status::MethodNotAllowed,
            Self::NoRouteMatched { .. }      => Status::NotFound,
            Self::FileNotUploaded(_)
            | Self::InvalidFileName(_)       => Status::BadRequest,
            _                                => Status::InternalServerError,
        }
    }

    /// True for the two "no such route" outcomes.
    pub fn is_routing(&self) -> bool {
        matches!(self, Self::MethodNotRegistered { .. } | Self::NoRouteMatched { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_failures_map_to_404_and_405() {
        let e = Error::NoRouteMatched { path: "/x".into() };
        assert_eq!(e.status().code(), 404);
        assert!(e.is_routing());

        let e = Error::MethodNotRegistered { method: "POST".into(), path: "/x".into() };
        assert_eq!(e.status().code(), 405);
    }

    #[test]
    fn resolution_failures_map_to_500() {
        assert_eq!(Error::ControllerNotFound("Nope".into()).status().code(), 500);
        assert_eq!(Error::MiddlewareNotRegistered("auth".into()).status().code(), 500);
        assert!(!Error::ControllerNotFound("Nope".into()).is_routing());
    }

    #[test]
    fn destination_errors_render_the_path() {
        let e = Error::DestinationMissing(PathBuf::from("/tmp/nope"));
        assert_eq!(e.to_string(), "destination directory does not exist: /tmp/nope");
    }

    #[test]
    fn bad_upload_names_are_client_errors() {
        assert_eq!(Error::InvalidFileName("..".into()).status().code(), 400);
    }
}
