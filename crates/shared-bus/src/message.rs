//! # Transport Messages
//!
//! Raw messages as the transport sees them, and the confirmations it hands
//! back to publishers.

use std::collections::BTreeMap;

use shared_types::{ConfirmationContext, Envelope, SendResult};
use uuid::Uuid;

use crate::error::TransportError;

/// Application properties attached to a message.
pub type MessageProperties = BTreeMap<String, String>;

/// Property keys set on every published message.
pub mod properties {
    pub const MESSAGE_ID: &str = "message-id";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const CONTENT_ENCODING: &str = "content-encoding";
    pub const OUTPUT_NAME: &str = "output-name";
}

/// A message in flight: UTF-8 payload bytes plus properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMessage {
    payload: Vec<u8>,
    properties: MessageProperties,
}

impl TransportMessage {
    /// Wrap raw bytes with no properties.
    pub fn from_bytes(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            properties: MessageProperties::new(),
        }
    }

    /// Encode an envelope for publication on `output`.
    pub fn from_envelope(envelope: &Envelope, output: &str) -> Result<Self, TransportError> {
        let payload = envelope
            .encode()
            .map_err(|e| TransportError::Encode(e.to_string()))?;

        let mut props = MessageProperties::new();
        props.insert(
            properties::MESSAGE_ID.to_string(),
            Uuid::new_v4().to_string(),
        );
        props.insert(
            properties::CONTENT_TYPE.to_string(),
            "application/json".to_string(),
        );
        props.insert(properties::CONTENT_ENCODING.to_string(), "utf-8".to_string());
        props.insert(properties::OUTPUT_NAME.to_string(), output.to_string());

        Ok(Self {
            payload,
            properties: props,
        })
    }

    /// Add or replace one property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn properties(&self) -> &MessageProperties {
        &self.properties
    }

    /// The `message-id` property, if present.
    pub fn message_id(&self) -> Option<&str> {
        self.properties
            .get(properties::MESSAGE_ID)
            .map(String::as_str)
    }
}

/// Completion notice for one publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// The envelope that was published.
    pub envelope: Envelope,
    /// Whether the transport took the message.
    pub result: SendResult,
    /// Token passed to `publish`, returned unchanged.
    pub context: ConfirmationContext,
    /// Properties of the published message.
    pub properties: MessageProperties,
}
