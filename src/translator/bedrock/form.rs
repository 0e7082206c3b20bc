//! Completion of pending UI forms.

use crate::{protocol::bedrock::packets as bedrock, session::Session};

/// Fulfills the single-shot slot installed when the form was sent.
/// Unknown and repeated ids are dropped; the client can answer a form
/// at most once.
pub fn modal_form_response(
    session: &mut Session,
    packet: bedrock::ModalFormResponse,
) -> anyhow::Result<()> {
    let trimmed = packet.form_data.trim();
    let response = if trimmed.is_empty() || trimmed == "null" {
        None
    } else {
        match serde_json::from_str(trimmed) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(form = packet.form_id, "malformed form response: {e}");
                None
            }
        }
    };

    if !session.complete_form(packet.form_id, response) {
        tracing::debug!(form = packet.form_id, "response for unknown form, dropping");
    }
    Ok(())
}
