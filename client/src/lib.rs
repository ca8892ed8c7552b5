//! HTTP client for the Inkwell blogging platform API.
//!
//! ARCHITECTURE
//! ============
//! The session layer owns everything token-shaped: the [`CredentialStore`]
//! persists the `{user, accessToken, refreshToken}` record across process
//! restarts, the [`AuthState`] projection is the reactive view the rest of
//! the application reads, and the [`ApiClient`] dispatcher attaches the
//! current access token to every outbound request, refreshing it once
//! (behind a single-flight gate) when the server answers 401.
//!
//! Endpoint wrappers in [`api`] are thin typed shims over the dispatcher;
//! they carry no retry or token logic of their own.

pub mod api;
pub mod config;
pub mod error;
pub mod net;
pub mod session;

pub use config::ClientConfig;
pub use error::Error;
pub use net::dispatcher::ApiClient;
pub use session::state::AuthState;
pub use session::store::CredentialStore;
pub use session::types::{Session, User};
