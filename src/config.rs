use std::path::PathBuf;

use crate::admin::DEFAULT_ADMIN_PASSPHRASE;
use crate::data::DEFAULT_STORE_PATH;

/// Runtime settings for a quiz session.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file holding the question collection.
    pub store_path: PathBuf,
    /// Endpoint that receives a full copy of the collection after each change.
    pub remote_url: Option<String>,
    /// Shared secret that unlocks admin mode.
    pub admin_passphrase: String,
    /// mpv-compatible program used to play question audio.
    pub player: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            remote_url: None,
            admin_passphrase: DEFAULT_ADMIN_PASSPHRASE.to_string(),
            player: None,
        }
    }
}
