//! # API Module
//!
//! HTTP endpoints of the local server that runs during `spytcli auth`.
//!
//! - [`callback`] - Receives the OAuth redirect from Spotify or Google and
//!   exchanges the authorization code for a token using the PKCE verifier
//!   held in the shared state.
//! - [`health`] - Liveness check that also reports whether the pending
//!   authorization has completed.
//!
//! Both handlers share an `Arc<Mutex<Option<PkceToken>>>` injected as an
//! axum [`Extension`](axum::Extension) by [`crate::server`].

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
