//! Controller module - Application logic
//!
//! Ties the remote gateway, the model and the player together.
//!
//! - `library`: catalog view mount, favorites, stats and profile
//! - `playback`: the player and its simulated clock

mod library;
mod playback;

use std::sync::Arc;

use crate::auth::AuthContext;
use crate::error::ClientError;
use crate::model::{AppModel, CatalogGateway};

pub use library::LoadSummary;
pub use playback::{Player, DEFAULT_TICK_INTERVAL};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<AppModel>,
    pub(crate) gateway: Arc<dyn CatalogGateway>,
    pub(crate) auth: AuthContext,
    pub(crate) player: Arc<Player>,
}

impl AppController {
    pub fn new(
        model: Arc<AppModel>,
        gateway: Arc<dyn CatalogGateway>,
        auth: AuthContext,
        player: Player,
    ) -> Self {
        Self {
            model,
            gateway,
            auth,
            player: Arc::new(player),
        }
    }

    pub fn model(&self) -> &AppModel {
        &self.model
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub(crate) fn format_error(error: &ClientError) -> String {
        match error {
            ClientError::AuthenticationRequired => "You must be signed in to continue.".to_string(),
            ClientError::NetworkFailure(_) => {
                "Could not reach the music service. Check your connection and try again.".to_string()
            }
            ClientError::RemoteError { message, .. } => message.clone(),
            ClientError::MalformedResponse(_) => {
                "The music service sent a response we could not read.".to_string()
            }
            ClientError::MalformedDuration(raw) => {
                format!("This track cannot be played: invalid duration {raw:?}.")
            }
            ClientError::TrackNotFound(_) => "That song is not in the catalog.".to_string(),
            ClientError::ToggleInFlight(_) => {
                "Still saving your previous change to this song.".to_string()
            }
        }
    }
}
