//! Authorization orchestrator.
//!
//! Drives one login attempt end to end: resolve the user's DM channel,
//! open a correlation slot, send the Allow/Deny prompt, and wait for the
//! verdict with a bounded deadline.

use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::errors::DkError;
use crate::gateway::{LoginPrompt, MessagingGateway};
use crate::models::{AccountLink, ServerRecord};
use crate::registry::{PendingAuthorizations, WaitOutcome};

/// What the front door reports back to the game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied,
    TimedOut,
}

/// Ask the linked Discord user whether this login attempt may proceed.
///
/// Sends exactly one prompt per invocation and opens a fresh token each
/// time; no slot survives this function, whichever way it exits.
#[instrument(
    skip_all,
    fields(server_id = %server.id, minecraft_name = %link.minecraft_name, source = %source_address)
)]
pub async fn authorize<G: MessagingGateway>(
    gateway: &G,
    registry: &PendingAuthorizations,
    server: &ServerRecord,
    link: &AccountLink,
    source_address: &str,
    within: Duration,
) -> Result<Decision, DkError> {
    // Resolve the channel before opening a slot so a failure here leaves
    // nothing behind in the registry.
    let channel = gateway.open_direct_channel(&link.user_id).await.map_err(|e| {
        warn!(user_id = %link.user_id, error = %e, "could not open direct channel");
        e
    })?;

    let token = registry.open();
    let prompt = LoginPrompt {
        server_address: server.address.clone(),
        source_address: source_address.to_string(),
        token,
    };

    if let Err(e) = gateway.send_login_prompt(&channel, &prompt).await {
        // The slot was already opened; evict it before surfacing the error.
        registry.abandon(token);
        warn!(%token, error = %e, "could not send login prompt");
        return Err(e);
    }

    let decision = match registry.wait(token, within).await? {
        WaitOutcome::Allowed => Decision::Allowed,
        WaitOutcome::Denied => Decision::Denied,
        WaitOutcome::TimedOut => {
            info!(%token, "authorization timed out without an answer");
            Decision::TimedOut
        }
        WaitOutcome::Unknown => {
            // Should not happen for a token we just opened; treat like a
            // timeout for the caller but keep it visible in the logs.
            warn!(%token, "authorization slot vanished while waiting");
            Decision::TimedOut
        }
    };

    info!(%token, ?decision, "authorization resolved");
    Ok(decision)
}
