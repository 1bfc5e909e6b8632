use crate::envelope::Envelope;
use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{Direction, Message};
use crate::origin::OriginPolicy;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// One side of an Outer/Inner channel. Envelopes travel as JSON text, the
/// same shape a browser `postMessage` would carry.
#[derive(Debug)]
pub struct Endpoint {
    origin: String,
    /// Direction of messages this endpoint receives
    inbound: Direction,
    policy: OriginPolicy,
    tx: UnboundedSender<String>,
    rx: UnboundedReceiver<String>,
}

/// Connected `(outer, inner)` endpoints. Each side accepts only the other
/// side's origin.
pub fn channel(outer_origin: &str, inner_origin: &str) -> (Endpoint, Endpoint) {
    let (to_inner, inner_rx) = mpsc::unbounded_channel();
    let (to_outer, outer_rx) = mpsc::unbounded_channel();

    let outer = Endpoint {
        origin: outer_origin.to_string(),
        inbound: Direction::InnerToOuter,
        policy: OriginPolicy::allow([inner_origin]),
        tx: to_inner,
        rx: outer_rx,
    };
    let inner = Endpoint {
        origin: inner_origin.to_string(),
        inbound: Direction::OuterToInner,
        policy: OriginPolicy::allow([outer_origin]),
        tx: to_outer,
        rx: inner_rx,
    };
    (outer, inner)
}

impl Endpoint {
    pub fn with_policy(mut self, policy: OriginPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn policy(&self) -> &OriginPolicy {
        &self.policy
    }

    /// Post a message to the other side. Fire-and-forget: the only failure
    /// is a closed channel.
    pub fn post(&self, message: Message) -> ProtocolResult<()> {
        let outbound = match self.inbound {
            Direction::OuterToInner => Direction::InnerToOuter,
            Direction::InnerToOuter => Direction::OuterToInner,
        };
        if message.direction() != outbound {
            return Err(ProtocolError::WrongDirection {
                message: message.name(),
                direction: outbound.describe(),
            });
        }

        debug!(message = message.name(), origin = %self.origin, "Posting message");
        let json = Envelope::new(self.origin.clone(), message).to_json()?;
        self.tx.send(json).map_err(|_| ProtocolError::Disconnected)
    }

    /// Post a raw JSON string, as an untrusted page script could
    pub fn post_raw(&self, raw: impl Into<String>) -> ProtocolResult<()> {
        self.tx.send(raw.into()).map_err(|_| ProtocolError::Disconnected)
    }

    /// Check an envelope against this endpoint's origin policy and
    /// inbound direction
    pub fn admit(&self, envelope: &Envelope) -> ProtocolResult<()> {
        if !self.policy.accepts(&envelope.origin) {
            return Err(ProtocolError::OriginRejected(envelope.origin.clone()));
        }
        if envelope.message.direction() != self.inbound {
            return Err(ProtocolError::WrongDirection {
                message: envelope.message.name(),
                direction: self.inbound.describe(),
            });
        }
        Ok(())
    }

    /// Wait for the next admissible envelope; `None` once the other side
    /// is gone
    pub async fn recv(&mut self) -> Option<Envelope> {
        loop {
            let raw = self.rx.recv().await?;
            if let Some(envelope) = self.screen(&raw) {
                return Some(envelope);
            }
        }
    }

    /// Next admissible envelope already queued, without waiting
    pub fn try_recv(&mut self) -> Option<Envelope> {
        loop {
            match self.rx.try_recv() {
                Ok(raw) => {
                    if let Some(envelope) = self.screen(&raw) {
                        return Some(envelope);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Every admissible envelope already queued
    pub fn drain(&mut self) -> Vec<Envelope> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    fn screen(&self, raw: &str) -> Option<Envelope> {
        let envelope = match Envelope::from_json(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable envelope");
                return None;
            }
        };
        match self.admit(&envelope) {
            Ok(()) => Some(envelope),
            Err(e) => {
                warn!(error = %e, origin = %envelope.origin, "Dropping envelope");
                None
            }
        }
    }
}
