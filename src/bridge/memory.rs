//! In-memory transport for exercising the bridge loop without a broker.

use std::collections::VecDeque;

use async_trait::async_trait;
use bytes::Bytes;

use super::{InboundMessage, MessageSource, Publication, Publisher};
use crate::error::VBusError;

/// Queue of inbound messages plus a record of everything published.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    inbound: VecDeque<InboundMessage>,
    published: Vec<Publication>,
    /// Publish attempts to reject, counted down per attempt
    failures: usize,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message to be returned by `next_message`
    pub fn push_message(&mut self, topic: &str, payload: impl Into<Bytes>) {
        self.inbound.push_back(InboundMessage::new(topic, payload));
    }

    /// Reject the next `count` publish attempts
    pub fn fail_next_publishes(&mut self, count: usize) {
        self.failures = count;
    }

    pub fn published(&self) -> &[Publication] {
        &self.published
    }

    pub fn pending(&self) -> usize {
        self.inbound.len()
    }
}

impl Publisher for MemoryTransport {
    fn publish(&mut self, publication: &Publication) -> Result<(), VBusError> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(VBusError::Transport("publish queue full".to_string()));
        }
        self.published.push(publication.clone());
        Ok(())
    }
}

#[async_trait]
impl MessageSource for MemoryTransport {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>, VBusError> {
        Ok(self.inbound.pop_front())
    }
}
