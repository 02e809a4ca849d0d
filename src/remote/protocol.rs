// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Remote command wire format.
//!
//! Each UDP datagram carries one UTF-8 JSON envelope:
//!
//! ```json
//! { "topic": 1, "payload": "{\"page\":2,\"label\":\"Toggle Console Output\"}" }
//! ```
//!
//! The topic says how to read the payload, which is itself a JSON document
//! encoded as a string. Only [`Topic::RemoteCommand`] is understood.

use serde::{Deserialize, Serialize};

use crate::{error::DecodeError, page::Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    None,
    RemoteCommand,
}

impl Topic {
    pub const fn value(self) -> i64 {
        match self {
            Topic::None => 0,
            Topic::RemoteCommand => 1,
        }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Topic::None),
            1 => Some(Topic::RemoteCommand),
            _ => None,
        }
    }
}

/// The outer envelope.
///
/// The topic is kept as a raw integer so that an unknown topic is reported as
/// such rather than as a malformed envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkMessage {
    #[serde(default)]
    pub topic: i64,
    #[serde(default)]
    pub payload: String,
}

impl NetworkMessage {
    pub fn new(topic: Topic, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.value(),
            payload: payload.into(),
        }
    }

    pub fn topic(&self) -> Option<Topic> {
        Topic::from_value(self.topic)
    }
}

/// A request to run the command labelled `label` on `page`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCommand {
    pub page: Page,
    pub label: String,
}

impl RemoteCommand {
    pub fn new(page: Page, label: impl Into<String>) -> Self {
        Self {
            page,
            label: label.into(),
        }
    }

    /// Encodes the command as a complete datagram.
    pub fn to_datagram(&self) -> Result<Vec<u8>, serde_json::Error> {
        let payload = serde_json::to_string(self)?;
        serde_json::to_vec(&NetworkMessage::new(Topic::RemoteCommand, payload))
    }
}

/// Decodes a datagram into a remote command.
pub fn decode_datagram(bytes: &[u8]) -> Result<RemoteCommand, DecodeError> {
    let text = std::str::from_utf8(bytes)?;
    let message: NetworkMessage = serde_json::from_str(text).map_err(DecodeError::Envelope)?;

    match message.topic() {
        Some(Topic::RemoteCommand) => {
            serde_json::from_str(&message.payload).map_err(|source| DecodeError::Payload {
                payload: message.payload.clone(),
                source,
            })
        }
        Some(Topic::None) | None => Err(DecodeError::UnknownTopic(message.topic)),
    }
}
