//! Socket ↔ polling-loop channels.
//!
//! Uses `embassy-sync` bounded channels to bridge the HTTP server's
//! websocket callbacks with the synchronous polling loop.  Producers never
//! block: a full channel drops the message with a warning.
//!
//! ```text
//! ┌──────────────┐  InboundLine   ┌──────────────┐
//! │  WS handler  │──────────────▶│ Polling loop │
//! │  (httpd task)│◀──────────────│   (main)     │
//! └──────────────┘  OutboundMsg   └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;
use log::warn;

use super::{ConnectionId, LINE_CAPACITY, MESSAGE_CAPACITY};
use crate::error::ProtocolFault;

/// What a connection delivered to the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A new client connected and should be greeted.
    Connected,
    /// One text line.
    Line(String<LINE_CAPACITY>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMsg {
    pub connection: ConnectionId,
    pub body: Inbound,
}

/// Where an outbound message goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    One(ConnectionId),
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMsg {
    pub to: Recipient,
    pub text: String<MESSAGE_CAPACITY>,
}

const INBOUND_DEPTH: usize = 8;
const OUTBOUND_DEPTH: usize = 16;

pub type InboundQueue = Channel<CriticalSectionRawMutex, InboundMsg, INBOUND_DEPTH>;
pub type OutboundQueue = Channel<CriticalSectionRawMutex, OutboundMsg, OUTBOUND_DEPTH>;

/// Inbound lines: websocket handler → polling loop.
pub static INBOUND: InboundQueue = Channel::new();

/// Replies and broadcasts: polling loop → websocket sender.
pub static OUTBOUND: OutboundQueue = Channel::new();

/// Queue one received line.  Over-long lines are dropped whole.
pub fn submit_line(
    queue: &InboundQueue,
    connection: ConnectionId,
    text: &str,
) -> Result<(), ProtocolFault> {
    let mut line = String::new();
    if line.push_str(text).is_err() {
        warn!("[{}] dropped {}-byte line", connection, text.len());
        return Err(ProtocolFault::Oversized);
    }
    if queue
        .try_send(InboundMsg {
            connection,
            body: Inbound::Line(line),
        })
        .is_err()
    {
        warn!("[{}] inbound queue full, line dropped", connection);
    }
    Ok(())
}

/// Queue the greeting request for a new connection.
pub fn submit_connect(queue: &InboundQueue, connection: ConnectionId) {
    if queue
        .try_send(InboundMsg {
            connection,
            body: Inbound::Connected,
        })
        .is_err()
    {
        warn!("[{}] inbound queue full, greeting dropped", connection);
    }
}

/// Queue `text` for delivery.  Text past the frame capacity is cut.
pub fn push_outbound(queue: &OutboundQueue, to: Recipient, text: &str) {
    let mut frame = String::new();
    for ch in text.chars() {
        if frame.push(ch).is_err() {
            warn!("outbound frame truncated at {} bytes", frame.len());
            break;
        }
    }
    if queue.try_send(OutboundMsg { to, text: frame }).is_err() {
        warn!("outbound queue full, message dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_roundtrips_through_queue() {
        let q = InboundQueue::new();
        submit_connect(&q, ConnectionId(3));
        submit_line(&q, ConnectionId(3), "WIFI").unwrap();

        assert_eq!(q.try_receive().unwrap().body, Inbound::Connected);
        let msg = q.try_receive().unwrap();
        assert_eq!(msg.connection, ConnectionId(3));
        assert_eq!(msg.body, Inbound::Line(String::try_from("WIFI").unwrap()));
        assert!(q.try_receive().is_err());
    }

    #[test]
    fn oversized_line_is_rejected() {
        let q = InboundQueue::new();
        let long = "x".repeat(LINE_CAPACITY + 1);
        assert_eq!(
            submit_line(&q, ConnectionId(1), &long),
            Err(ProtocolFault::Oversized)
        );
        assert!(q.try_receive().is_err());
    }

    #[test]
    fn full_queue_drops_without_blocking() {
        let q = InboundQueue::new();
        for _ in 0..INBOUND_DEPTH + 3 {
            submit_line(&q, ConnectionId(1), "SWITCH").unwrap();
        }
        let mut n = 0;
        while q.try_receive().is_ok() {
            n += 1;
        }
        assert_eq!(n, INBOUND_DEPTH);
    }

    #[test]
    fn outbound_keeps_recipient() {
        let q = OutboundQueue::new();
        push_outbound(&q, Recipient::All, "STATE CHANGED");
        let msg = q.try_receive().unwrap();
        assert_eq!(msg.to, Recipient::All);
        assert_eq!(msg.text.as_str(), "STATE CHANGED");
    }
}
