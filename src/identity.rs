//! External identity-provider integration. The only call we make is the
//! account disable that follows a user deactivation, and it is best-effort:
//! the database row is the source of truth for `is_active`, so failures here
//! are logged and swallowed.

use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::IdentityConfig;

#[derive(Debug, Clone)]
pub enum IdentityProvider {
    Http {
        client: reqwest::Client,
        endpoint: String,
        api_key: String,
    },
    /// No provider configured; disable calls become no-ops.
    Disabled,
}

impl IdentityProvider {
    pub fn from_config(config: Option<&IdentityConfig>) -> Self {
        match config {
            Some(cfg) => IdentityProvider::Http {
                client: reqwest::Client::new(),
                endpoint: cfg.disable_endpoint.clone(),
                api_key: cfg.api_key.clone(),
            },
            None => IdentityProvider::Disabled,
        }
    }

    /// Attempts to disable the provider-side account for `user_id`. Never
    /// fails the caller.
    pub async fn disable_account(&self, user_id: &str) {
        match self {
            IdentityProvider::Disabled => {
                debug!(user_id, "no identity provider configured, skipping disable");
            }
            IdentityProvider::Http {
                client,
                endpoint,
                api_key,
            } => {
                let result = client
                    .post(endpoint)
                    .header("x-api-key", api_key)
                    .json(&json!({ "username": user_id }))
                    .send()
                    .await;
                match result {
                    Ok(response) if response.status().is_success() => {
                        info!(user_id, "identity provider account disabled");
                    }
                    Ok(response) => {
                        warn!(
                            user_id,
                            status = %response.status(),
                            "identity provider rejected account disable"
                        );
                    }
                    Err(err) => {
                        warn!(user_id, error = %err, "identity provider disable call failed");
                    }
                }
            }
        }
    }
}
