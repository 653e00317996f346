// SPDX-FileCopyrightText: 2026 Comanda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translation between Telegram updates and Comanda events.
//!
//! Decides which messages count as customer traffic, turns them into
//! [`InboundEvent`]s, and builds the outbound pieces (recipients, inline
//! keyboards) from channel-agnostic types.

use std::str::FromStr;

use comanda_core::{
    Action, ActionSet, ComandaError, Command, Coordinate, InboundEvent, InboundKind, UserId,
};
use teloxide::prelude::*;
use teloxide::types::{ChatKind, InlineKeyboardButton, InlineKeyboardMarkup, Recipient};
use tracing::{debug, warn};

/// Checks whether the message comes from a private (DM) chat.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Parses `/start` or `/cancel`, with or without an `@botname` suffix.
///
/// Anything after the command word is ignored. Unknown commands are `None`
/// and flow to the model as ordinary text.
pub fn parse_command(text: &str) -> Option<Command> {
    let word = text.trim().strip_prefix('/')?.split_whitespace().next()?;
    let name = word.split('@').next()?;
    Command::from_str(&name.to_ascii_lowercase()).ok()
}

/// Maps a customer message to an event.
///
/// Returns `None` for messages without a sender and for kinds the bot does
/// not understand (stickers, photos, and so on).
pub fn to_inbound_event(msg: &Message) -> Option<InboundEvent> {
    let user = msg.from.as_ref()?;
    let kind = if let Some(location) = msg.location() {
        match Coordinate::new(location.latitude, location.longitude) {
            Ok(point) => InboundKind::Location(point),
            Err(e) => {
                warn!(error = %e, "ignoring location with invalid coordinates");
                return None;
            }
        }
    } else if let Some(text) = msg.text() {
        match parse_command(text) {
            Some(command) => InboundKind::Command(command),
            None => InboundKind::Text(text.to_string()),
        }
    } else {
        debug!(msg_id = msg.id.0, "ignoring unsupported message type");
        return None;
    };

    Some(InboundEvent {
        user_id: UserId(user.id.0),
        chat_id: msg.chat.id.0.to_string(),
        kind,
    })
}

/// Resolves a recipient string: a numeric chat id or an `@channel` name.
pub fn parse_recipient(recipient: &str) -> Result<Recipient, ComandaError> {
    let recipient = recipient.trim();
    if let Ok(id) = recipient.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }
    if recipient.len() > 1 && recipient.starts_with('@') {
        return Ok(Recipient::ChannelUsername(recipient.to_string()));
    }
    Err(ComandaError::Channel {
        message: format!("invalid recipient `{recipient}`: expected a chat id or @channel"),
        source: None,
    })
}

/// One button per row, in action order. `None` when there are no actions.
///
/// A URL that does not parse is dropped with a warning; the rest still render.
pub fn keyboard(actions: &ActionSet) -> Option<InlineKeyboardMarkup> {
    let rows: Vec<Vec<InlineKeyboardButton>> = actions
        .iter()
        .filter_map(|action| match action {
            Action::Url { label, url } => match reqwest::Url::parse(url) {
                Ok(parsed) => Some(InlineKeyboardButton::url(label.clone(), parsed)),
                Err(e) => {
                    warn!(url = url.as_str(), error = %e, "dropping button with invalid URL");
                    None
                }
            },
            Action::Callback { label, data } => {
                Some(InlineKeyboardButton::callback(label.clone(), data.clone()))
            }
        })
        .map(|button| vec![button])
        .collect();

    if rows.is_empty() {
        None
    } else {
        Some(InlineKeyboardMarkup::new(rows))
    }
}
