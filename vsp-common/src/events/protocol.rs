//! Notification protocol between the playlist controller and its display client
//!
//! Every message travels as an [`Envelope`]: `{"notification": NAME, "payload": {...}}`.
//! Names may carry the `<service-name>-` prefix used by the display module
//! (`MMM-VideoServerPlayer-SET_CONFIG`); the prefix is stripped before dispatch.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::VideoDescriptor;
use crate::{Error, Result};

/// Raw notification as carried by any transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Notification name, optionally prefixed with `<service-name>-`
    pub notification: String,
    /// Notification payload (absent or `null` for RESET)
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    /// Notification name with the service prefix removed
    pub fn bare_name<'a>(&'a self, service_name: &str) -> &'a str {
        self.notification
            .strip_prefix(service_name)
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or(&self.notification)
    }
}

/// SET_CONFIG payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetConfigPayload {
    /// Requested video paths, in playlist order
    #[serde(default)]
    pub videos: Vec<String>,
    /// Shuffle the playlist on rebuild
    #[serde(default)]
    pub shuffle: bool,
}

/// NEXT payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextPayload {
    /// Index the client just finished (or is finishing)
    #[serde(default)]
    pub index: Option<usize>,
    /// Remaining playback time hint in milliseconds
    #[serde(default, deserialize_with = "lenient_millis")]
    pub timeout_ms: Option<u64>,
}

/// Inbound notifications (display client → controller)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientNotification {
    /// Replace the requested playlist
    SetConfig(SetConfigPayload),
    /// Playback of the current video is ending; advance
    Next(NextPayload),
    /// Forget all state from a previous client session
    Reset,
}

impl ClientNotification {
    pub const SET_CONFIG: &'static str = "SET_CONFIG";
    pub const NEXT: &'static str = "NEXT";
    pub const RESET: &'static str = "RESET";

    /// Protocol name of this notification
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetConfig(_) => Self::SET_CONFIG,
            Self::Next(_) => Self::NEXT,
            Self::Reset => Self::RESET,
        }
    }

    /// Decode an envelope, stripping the optional service prefix
    ///
    /// Unknown names and malformed payloads are [`Error::Protocol`].
    pub fn from_envelope(envelope: &Envelope, service_name: &str) -> Result<Self> {
        let name = envelope.bare_name(service_name);
        match name {
            Self::SET_CONFIG => Ok(Self::SetConfig(payload_or_default(name, &envelope.payload)?)),
            Self::NEXT => Ok(Self::Next(payload_or_default(name, &envelope.payload)?)),
            Self::RESET => Ok(Self::Reset),
            other => Err(Error::Protocol(format!("unknown notification '{}'", other))),
        }
    }

    /// Decode a JSON text frame
    pub fn from_json(text: &str, service_name: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(text)
            .map_err(|e| Error::Protocol(format!("malformed envelope: {}", e)))?;
        Self::from_envelope(&envelope, service_name)
    }

    /// Encode as an unprefixed envelope
    pub fn to_envelope(&self) -> Envelope {
        let payload = match self {
            Self::SetConfig(p) => serde_json::to_value(p).unwrap_or(Value::Null),
            Self::Next(p) => serde_json::to_value(p).unwrap_or(Value::Null),
            Self::Reset => Value::Null,
        };
        Envelope {
            notification: self.name().to_string(),
            payload,
        }
    }
}

/// Outbound notifications (controller → display client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerNotification {
    /// The committed current video; sent on every commit and on each resync tick
    CurrentVideo(VideoDescriptor),
}

impl ServerNotification {
    pub const CURRENT_VIDEO: &'static str = "CURRENT_VIDEO";

    /// Protocol name of this notification
    pub fn name(&self) -> &'static str {
        match self {
            Self::CurrentVideo(_) => Self::CURRENT_VIDEO,
        }
    }

    /// Payload as JSON
    pub fn payload(&self) -> Value {
        match self {
            Self::CurrentVideo(descriptor) => {
                serde_json::to_value(descriptor).unwrap_or(Value::Null)
            }
        }
    }

    /// Encode as an unprefixed envelope
    pub fn to_envelope(&self) -> Envelope {
        Envelope {
            notification: self.name().to_string(),
            payload: self.payload(),
        }
    }
}

fn payload_or_default<T>(name: &str, payload: &Value) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload.clone())
        .map_err(|e| Error::Protocol(format!("invalid {} payload: {}", name, e)))
}

/// Accept any JSON number for a millisecond hint; negatives clamp to zero
fn lenient_millis<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value.map(|ms| if ms.is_finite() && ms > 0.0 { ms as u64 } else { 0 }))
}
