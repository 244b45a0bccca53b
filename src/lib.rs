//! Core of a music-streaming client: playback session, catalog view
//! pipeline and favorites reconciliation against a remote catalog service.

pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;

pub use auth::{AuthContext, AuthToken};
pub use controller::{AppController, Player};
pub use error::{ClientError, Result};
