//! Discord interaction endpoint.
//!
//! All inbound traffic from Discord lands here: slash commands, button
//! presses, and modal submissions. Replies are returned directly in the
//! HTTP response, so no outbound REST call is needed to answer an
//! interaction. Malformed or stale identifiers are logged and answered
//! with an ephemeral notice; they never fail the whole endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::errors::DkError;
use crate::gateway::{ControlId, MessagingGateway, ModalId};
use crate::handlers::AppState;
use crate::registry::Verdict;
use crate::repositories::servers;
use crate::services::linking::{self, RegistrationOutcome, UpdateOutcome};

// Interaction types (Discord API).
const PING: u8 = 1;
const APPLICATION_COMMAND: u8 = 2;
const MESSAGE_COMPONENT: u8 = 3;
const MODAL_SUBMIT: u8 = 5;

// Interaction response types.
const PONG: u8 = 1;
const CHANNEL_MESSAGE_WITH_SOURCE: u8 = 4;
const MODAL: u8 = 9;

/// Only the requester sees the reply.
const EPHEMERAL: u32 = 64;

#[derive(Debug, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    data: Option<InteractionData>,
    #[serde(default)]
    member: Option<Member>,
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    guild_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InteractionData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    custom_id: Option<String>,
    #[serde(default)]
    options: Option<Vec<CommandOption>>,
    #[serde(default)]
    components: Option<Vec<ActionRow>>,
}

#[derive(Debug, Deserialize)]
struct CommandOption {
    name: String,
    value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ActionRow {
    #[serde(default)]
    components: Vec<TextInput>,
}

#[derive(Debug, Deserialize)]
struct TextInput {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(default)]
    nick: Option<String>,
    user: User,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
    username: String,
}

impl Interaction {
    /// The acting user: guild interactions carry a member, DM interactions
    /// a bare user.
    fn actor(&self) -> Option<&User> {
        self.member
            .as_ref()
            .map(|m| &m.user)
            .or(self.user.as_ref())
    }

    /// Guild nickname when set, account name otherwise.
    fn display_name(&self) -> Option<String> {
        let member_nick = self
            .member
            .as_ref()
            .and_then(|m| m.nick.as_deref())
            .filter(|nick| !nick.is_empty());
        match member_nick {
            Some(nick) => Some(nick.to_string()),
            None => self.actor().map(|u| u.username.clone()),
        }
    }

    fn custom_id(&self) -> Option<&str> {
        self.data.as_ref()?.custom_id.as_deref()
    }

    fn command_name(&self) -> Option<&str> {
        self.data.as_ref()?.name.as_deref()
    }

    fn option_str(&self, name: &str) -> Option<&str> {
        self.data
            .as_ref()?
            .options
            .as_ref()?
            .iter()
            .find(|o| o.name == name)?
            .value
            .as_str()
    }

    /// Value of the first text input of a modal submission.
    fn text_input(&self) -> Option<&str> {
        let rows = self.data.as_ref()?.components.as_ref()?;
        let input = rows.first()?.components.first()?;
        Some(input.value.as_str())
    }
}

#[derive(Debug, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<ResponseData>,
}

#[derive(Debug, Default, Serialize)]
struct ResponseData {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flags: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    components: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl InteractionResponse {
    fn pong() -> Self {
        Self {
            kind: PONG,
            data: None,
        }
    }

    fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            kind: CHANNEL_MESSAGE_WITH_SOURCE,
            data: Some(ResponseData {
                content: Some(content.into()),
                flags: Some(EPHEMERAL),
                ..ResponseData::default()
            }),
        }
    }

    fn message(content: impl Into<String>, components: serde_json::Value) -> Self {
        Self {
            kind: CHANNEL_MESSAGE_WITH_SOURCE,
            data: Some(ResponseData {
                content: Some(content.into()),
                components: Some(components),
                ..ResponseData::default()
            }),
        }
    }

    /// A modal with a single short text input for a Minecraft name.
    fn name_modal(id: &ModalId, title: &str, label: &str) -> Self {
        Self {
            kind: MODAL,
            data: Some(ResponseData {
                custom_id: Some(id.to_string()),
                title: Some(title.to_string()),
                components: Some(json!([{
                    "type": 1,
                    "components": [{
                        "type": 4,
                        "custom_id": "minecraft-name",
                        "label": label,
                        "style": 1,
                        "placeholder": "Enter your minecraft name",
                        "required": true,
                        "min_length": 3,
                    }],
                }])),
                ..ResponseData::default()
            }),
        }
    }
}

/// Dispatch an inbound Discord interaction.
///
/// POST /interactions
pub async fn interactions<G: MessagingGateway>(
    State(state): State<Arc<AppState<G>>>,
    Json(interaction): Json<Interaction>,
) -> Result<Json<InteractionResponse>, DkError> {
    let response = match interaction.kind {
        PING => InteractionResponse::pong(),
        APPLICATION_COMMAND => handle_command(&state, &interaction).await?,
        MESSAGE_COMPONENT => handle_component(&state, &interaction).await?,
        MODAL_SUBMIT => handle_modal(&state, &interaction).await?,
        other => {
            warn!(kind = other, "unknown interaction type");
            InteractionResponse::ephemeral("This interaction is not supported.")
        }
    };

    Ok(Json(response))
}

async fn handle_command<G: MessagingGateway>(
    state: &AppState<G>,
    interaction: &Interaction,
) -> Result<InteractionResponse, DkError> {
    let Some(guild_id) = interaction.guild_id.as_deref() else {
        return Ok(InteractionResponse::ephemeral(
            "This command can only be used inside a guild.",
        ));
    };
    let Some(address) = interaction.option_str("address") else {
        warn!(command = ?interaction.command_name(), "command without an address option");
        return Ok(InteractionResponse::ephemeral("Missing server address."));
    };

    match interaction.command_name() {
        Some("setup") => {
            let server = match linking::provision_server(&state.pool, guild_id, address).await {
                Ok(server) => server,
                Err(DkError::Conflict(reason)) => {
                    return Ok(InteractionResponse::ephemeral(reason))
                }
                Err(e) => return Err(e),
            };
            Ok(InteractionResponse::ephemeral(format!(
                "Server has been set up.\nID: `{}`\nToken ||`{}`||\nCopy the ID and Token and paste it into plugin configuration. \n**Do not share the token**",
                server.id, server.token
            )))
        }
        Some("announce") => {
            let Some(server) = servers::get_by_address(&state.pool, guild_id, address).await?
            else {
                return Ok(InteractionResponse::ephemeral(
                    "No server found under the specified address in this guild.",
                ));
            };

            let register = ControlId::Register {
                server_id: server.id.clone(),
            };
            let update = ControlId::Update {
                server_id: server.id.clone(),
            };
            let components = json!([{
                "type": 1,
                "components": [
                    { "type": 2, "style": 1, "label": "Register", "custom_id": register.to_string() },
                    { "type": 2, "style": 1, "label": "Update", "custom_id": update.to_string() },
                ],
            }]);

            Ok(InteractionResponse::message(
                format!(
                    "View actions below for your Discord account within {}",
                    server.address
                ),
                components,
            ))
        }
        other => {
            warn!(command = ?other, "no handler for application command");
            Ok(InteractionResponse::ephemeral("Unknown command."))
        }
    }
}

async fn handle_component<G: MessagingGateway>(
    state: &AppState<G>,
    interaction: &Interaction,
) -> Result<InteractionResponse, DkError> {
    let raw = interaction.custom_id().unwrap_or_default();
    let control: ControlId = match raw.parse() {
        Ok(control) => control,
        Err(e) => {
            warn!(error = %e, "discarding component interaction");
            return Ok(InteractionResponse::ephemeral(
                "This control is no longer valid.",
            ));
        }
    };

    match control {
        ControlId::Authorization { token, verdict } => {
            let delivered = state.registry.deliver(token, verdict);
            if !delivered {
                // Duplicate press or an answer after the deadline.
                info!(%token, "verdict arrived for an expired or answered request");
                return Ok(InteractionResponse::ephemeral(
                    "This login request has already been handled or expired.",
                ));
            }
            let reply = match verdict {
                Verdict::Allow => "Authorization allowed! ✅",
                Verdict::Deny => "Authorization denied! ❌",
            };
            Ok(InteractionResponse::ephemeral(reply))
        }
        ControlId::Register { server_id } => {
            if servers::get(&state.pool, &server_id).await?.is_none() {
                return Ok(InteractionResponse::ephemeral("This link is no longer valid."));
            }
            let Some(user) = interaction.actor() else {
                return Ok(InteractionResponse::ephemeral("This control is no longer valid."));
            };
            if crate::repositories::links::exists_with_user(&state.pool, &server_id, &user.id)
                .await?
            {
                return Ok(InteractionResponse::ephemeral("You're already registered."));
            }
            let modal = ModalId::Registration { server_id };
            Ok(InteractionResponse::name_modal(
                &modal,
                "Account Registration",
                "Minecraft Name",
            ))
        }
        ControlId::Update { server_id } => {
            if servers::get(&state.pool, &server_id).await?.is_none() {
                return Ok(InteractionResponse::ephemeral("This link is no longer valid."));
            }
            let Some(user) = interaction.actor() else {
                return Ok(InteractionResponse::ephemeral("This control is no longer valid."));
            };
            if !crate::repositories::links::exists_with_user(&state.pool, &server_id, &user.id)
                .await?
            {
                return Ok(InteractionResponse::ephemeral("You're not registered."));
            }
            let modal = ModalId::Updation { server_id };
            Ok(InteractionResponse::name_modal(
                &modal,
                "Account Updation",
                "New Minecraft Name",
            ))
        }
    }
}

async fn handle_modal<G: MessagingGateway>(
    state: &AppState<G>,
    interaction: &Interaction,
) -> Result<InteractionResponse, DkError> {
    let raw = interaction.custom_id().unwrap_or_default();
    let modal: ModalId = match raw.parse() {
        Ok(modal) => modal,
        Err(e) => {
            warn!(error = %e, "discarding modal submission");
            return Ok(InteractionResponse::ephemeral(
                "This form is no longer valid.",
            ));
        }
    };

    let (Some(user), Some(display_name)) = (interaction.actor(), interaction.display_name())
    else {
        warn!("modal submission without an acting user");
        return Ok(InteractionResponse::ephemeral("This form is no longer valid."));
    };
    let Some(minecraft_name) = interaction.text_input() else {
        warn!("modal submission without a text input");
        return Ok(InteractionResponse::ephemeral("This form is no longer valid."));
    };

    match modal {
        ModalId::Registration { server_id } => {
            if servers::get(&state.pool, &server_id).await?.is_none() {
                return Ok(InteractionResponse::ephemeral("This link is no longer valid."));
            }
            let outcome = linking::register(
                &state.pool,
                &server_id,
                &user.id,
                &display_name,
                minecraft_name,
            )
            .await?;
            let reply = match outcome {
                RegistrationOutcome::Registered => {
                    "Registered! Now try to connect to the server."
                }
                RegistrationOutcome::AlreadyRegistered => "You're already registered.",
                RegistrationOutcome::NicknameTaken => "This nickname is already taken.",
            };
            Ok(InteractionResponse::ephemeral(reply))
        }
        ModalId::Updation { server_id } => {
            let outcome = linking::update(
                &state.pool,
                &server_id,
                &user.id,
                &display_name,
                minecraft_name,
            )
            .await?;
            let reply = match outcome {
                UpdateOutcome::Updated => {
                    "Updated! Now try to connect to the server with the new nickname."
                }
                UpdateOutcome::NotRegistered => "You're not registered.",
                UpdateOutcome::NicknameTaken => "This nickname is already taken.",
            };
            Ok(InteractionResponse::ephemeral(reply))
        }
    }
}
