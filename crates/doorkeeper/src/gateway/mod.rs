//! Messaging gateway boundary.
//!
//! The orchestrator only needs two capabilities from the chat platform:
//! opening a direct-message channel to a user and sending one login prompt
//! with Allow/Deny buttons into it. Everything else Discord-specific (REST
//! payloads, command registration, identifier wire formats) stays behind
//! this module.

mod custom_id;
mod discord;

pub use custom_id::{ControlId, MalformedId, ModalId};
pub use discord::DiscordGateway;

use std::future::Future;

use uuid::Uuid;

use crate::errors::DkError;

/// A direct-message channel the gateway can send into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef(pub String);

/// One login-approval prompt: where the login is happening, where it comes
/// from, and the token the Allow/Deny buttons report back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPrompt {
    pub server_address: String,
    pub source_address: String,
    pub token: Uuid,
}

/// What the authorization orchestrator needs from the chat platform.
pub trait MessagingGateway: Send + Sync + 'static {
    /// Resolve the direct-message channel for a user. Fails when the user
    /// is unreachable (left the guild, blocked the bot) or the platform is
    /// down.
    fn open_direct_channel(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<ChannelRef, DkError>> + Send;

    /// Send exactly one prompt with Allow/Deny controls tagged with the
    /// prompt's token.
    fn send_login_prompt(
        &self,
        channel: &ChannelRef,
        prompt: &LoginPrompt,
    ) -> impl Future<Output = Result<(), DkError>> + Send;
}
