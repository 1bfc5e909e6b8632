use crate::error::ProtocolResult;
use crate::message::Message;
use serde::{Deserialize, Serialize};

/// A message stamped with the origin of the context that posted it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub origin: String,
    pub message: Message,
}

impl Envelope {
    pub fn new(origin: impl Into<String>, message: Message) -> Self {
        Self {
            origin: origin.into(),
            message,
        }
    }

    pub fn to_json(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> ProtocolResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
