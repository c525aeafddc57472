//! Channel-backed command channel.
//!
//! Implements [`CommandChannel`] by queueing replies and broadcasts on an
//! outbound `embassy-sync` channel.  The websocket sender on the HTTP
//! server side drains the queue and writes frames to the sessions.

use crate::app::ports::CommandChannel;
use crate::protocol::ConnectionId;
use crate::protocol::channels::{OutboundQueue, Recipient, push_outbound};

pub struct ChannelOutbox {
    queue: &'static OutboundQueue,
}

impl ChannelOutbox {
    pub fn new(queue: &'static OutboundQueue) -> Self {
        Self { queue }
    }
}

impl CommandChannel for ChannelOutbox {
    fn reply(&mut self, connection: ConnectionId, text: &str) {
        push_outbound(self.queue, Recipient::One(connection), text);
    }

    fn broadcast(&mut self, text: &str) {
        push_outbound(self.queue, Recipient::All, text);
    }
}
