//! Client core for the employee API.
//!
//! # Overview
//! `RequestBuilder` turns a verb, a path, an optional JSON body and extra
//! headers into an `HttpRequest`, sends it through a `Transport`, and folds
//! whatever happens into an `Outcome`. `EmployeeStore` sits on top of it and
//! the router maps `/` to the employee listing.
//!
//! # Design
//! - Building and interpreting are separate from I/O (`build` / `interpret`),
//!   so hosts with their own HTTP stack can skip `Transport` entirely.
//! - Errors never escape as `Err` from a request; they land in
//!   `Outcome::error`.
//! - The bearer token lives in a `CredentialStore` shared with the host.
//!   Expired tokens are cleared by the builder, and the host decides how to
//!   navigate through the auth-expiry hook.

pub mod builder;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod outcome;
pub mod router;
pub mod store;
pub mod transport;
pub mod types;

pub use builder::{InFlight, RequestBuilder, AUTH_EXPIRED_REDIRECT, NO_BODY};
pub use config::ClientConfig;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, AUTHORIZATION};
pub use error::{ConfigError, CredentialError, HttpFailure, RequestError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use outcome::Outcome;
pub use router::{employee_router, EmployeeIndex, History, Router};
pub use store::EmployeeStore;
pub use transport::{ReqwestTransport, Transport};
pub use types::{Employee, Page};
