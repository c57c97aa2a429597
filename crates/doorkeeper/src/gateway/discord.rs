//! Discord REST client.
//!
//! Outbound traffic only: opening DM channels, sending login prompts, and
//! registering the two slash commands at startup. Inbound interactions
//! arrive on the HTTP router (`POST /interactions`) and never pass through
//! this client.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::errors::DkError;
use crate::gateway::{ChannelRef, ControlId, LoginPrompt, MessagingGateway};
use crate::registry::Verdict;

const API_BASE: &str = "https://discord.com/api/v10";

/// Request timeout for Discord REST calls in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Minimum length Discord enforces on the `address` command option.
const MIN_ADDRESS_LENGTH: u32 = 6;

#[derive(Debug, Deserialize)]
struct Channel {
    id: String,
}

pub struct DiscordGateway {
    http: reqwest::Client,
    bot_token: String,
    application_id: String,
    api_base: String,
}

impl DiscordGateway {
    pub fn new(bot_token: &str, application_id: &str) -> Self {
        Self::with_api_base(bot_token, application_id, API_BASE)
    }

    /// Point the client at a different API root (tests).
    pub fn with_api_base(bot_token: &str, application_id: &str, api_base: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            http,
            bot_token: bot_token.to_string(),
            application_id: application_id.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, DkError> {
        let response = self
            .http
            .post(format!("{}{path}", self.api_base))
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "doorkeeper.gateway", error = %e, path, "Discord request failed");
                DkError::Adapter("Discord unreachable".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(target: "doorkeeper.gateway", %status, path, "Discord rejected the request");
            return Err(DkError::Adapter(format!("Discord returned {status}")));
        }

        Ok(response)
    }

    /// Bulk-overwrite the application's global slash commands.
    pub async fn register_commands(&self) -> Result<(), DkError> {
        let commands = json!([
            {
                "name": "setup",
                "description": "Set up a Minecraft server",
                "type": 1,
                "options": [{
                    "type": 3,
                    "name": "address",
                    "description": "Address of the Minecraft server",
                    "required": true,
                    "min_length": MIN_ADDRESS_LENGTH,
                }],
            },
            {
                "name": "announce",
                "description": "Announce a Minecraft server",
                "type": 1,
                "options": [{
                    "type": 3,
                    "name": "address",
                    "description": "Address of the Minecraft server",
                    "required": true,
                    "min_length": MIN_ADDRESS_LENGTH,
                }],
            },
        ]);

        let response = self
            .http
            .put(format!(
                "{}/applications/{}/commands",
                self.api_base, self.application_id
            ))
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&commands)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "doorkeeper.gateway", error = %e, "Command registration failed");
                DkError::Adapter("Discord unreachable".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(DkError::Adapter(format!(
                "command registration returned {status}"
            )));
        }

        Ok(())
    }
}

/// Button row with Allow/Deny controls tagged with the prompt's token.
fn prompt_components(token: Uuid) -> serde_json::Value {
    let allow = ControlId::Authorization {
        token,
        verdict: Verdict::Allow,
    };
    let deny = ControlId::Authorization {
        token,
        verdict: Verdict::Deny,
    };
    json!([{
        "type": 1,
        "components": [
            {
                "type": 2,
                "style": 1,
                "label": "Allow",
                "emoji": { "name": "✅" },
                "custom_id": allow.to_string(),
            },
            {
                "type": 2,
                "style": 1,
                "label": "Deny",
                "emoji": { "name": "❌" },
                "custom_id": deny.to_string(),
            },
        ],
    }])
}

impl MessagingGateway for DiscordGateway {
    fn open_direct_channel(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<ChannelRef, DkError>> + Send {
        async move {
            let channel: Channel = self
                .post("/users/@me/channels", json!({ "recipient_id": user_id }))
                .await?
                .json()
                .await
                .map_err(|e| DkError::Adapter(format!("malformed channel response: {e}")))?;
            Ok(ChannelRef(channel.id))
        }
    }

    fn send_login_prompt(
        &self,
        channel: &ChannelRef,
        prompt: &LoginPrompt,
    ) -> impl Future<Output = Result<(), DkError>> + Send {
        async move {
            let body = json!({
                "content": format!(
                    "New login request for {} from {}",
                    prompt.server_address, prompt.source_address
                ),
                "components": prompt_components(prompt.token),
            });
            self.post(&format!("/channels/{}/messages", channel.0), body)
                .await?;
            Ok(())
        }
    }
}
