//! Websocket bridge between the ESP-IDF HTTP server and the polling loop.
//!
//! The httpd task only ever touches the bounded queues: a new session is
//! queued as [`Inbound::Connected`], every text frame as one line.  The
//! polling loop calls [`WsBridge::flush`] to move queued replies and
//! broadcasts onto the sockets through detached senders.
//!
//! [`Inbound::Connected`]: crate::protocol::channels::Inbound::Connected

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use esp_idf_svc::http::server::ws::{EspHttpWsConnection, EspHttpWsDetachedSender};
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::sys::{ESP_ERR_INVALID_SIZE, EspError};
use esp_idf_svc::ws::FrameType;
use log::{debug, info, warn};

use crate::protocol::channels::{
    InboundQueue, OutboundMsg, OutboundQueue, Recipient, submit_connect, submit_line,
};
use crate::protocol::{ConnectionId, LINE_CAPACITY};

const WS_PATH: &str = "/ws";
const MAX_SESSIONS: usize = 8;

type Senders = Arc<Mutex<HashMap<i32, EspHttpWsDetachedSender>>>;

pub struct WsBridge {
    _server: EspHttpServer<'static>,
    senders: Senders,
    outbound: &'static OutboundQueue,
}

impl WsBridge {
    /// Start the HTTP server and register the websocket endpoint.
    pub fn start(
        inbound: &'static InboundQueue,
        outbound: &'static OutboundQueue,
    ) -> anyhow::Result<Self> {
        let config = Configuration {
            stack_size: 10240,
            max_sessions: MAX_SESSIONS,
            ..Default::default()
        };
        let mut server = EspHttpServer::new(&config)?;
        let senders: Senders = Arc::new(Mutex::new(HashMap::new()));

        let handler_senders = senders.clone();
        server.ws_handler(WS_PATH, move |ws: &mut EspHttpWsConnection| {
            on_frame(ws, inbound, &handler_senders)
        })?;

        info!("WebSocket endpoint listening on {}", WS_PATH);
        Ok(Self {
            _server: server,
            senders,
            outbound,
        })
    }

    /// Deliver every queued outbound message.  Sessions whose sender
    /// fails are forgotten.
    pub fn flush(&self) {
        let Ok(mut senders) = self.senders.lock() else {
            warn!("WebSocket: sender table poisoned");
            return;
        };
        while let Ok(OutboundMsg { to, text }) = self.outbound.try_receive() {
            let mut dead = heapless::Vec::<i32, MAX_SESSIONS>::new();
            for (session, sender) in senders.iter_mut() {
                if let Recipient::One(ConnectionId(target)) = to {
                    if target != *session {
                        continue;
                    }
                }
                if let Err(e) = sender.send(FrameType::Text(false), text.as_bytes()) {
                    debug!("WebSocket [{}]: send failed ({:?})", session, e);
                    let _ = dead.push(*session);
                }
            }
            for session in dead {
                senders.remove(&session);
            }
        }
    }
}

fn on_frame(
    ws: &mut EspHttpWsConnection,
    inbound: &InboundQueue,
    senders: &Senders,
) -> Result<(), EspError> {
    let session = ws.session();

    if ws.is_new() {
        let sender = ws.create_detached_sender()?;
        if let Ok(mut table) = senders.lock() {
            table.insert(session, sender);
        }
        info!("WebSocket [{}]: connected", session);
        submit_connect(inbound, ConnectionId(session));
        return Ok(());
    }

    if ws.is_closed() {
        if let Ok(mut table) = senders.lock() {
            table.remove(&session);
        }
        info!("WebSocket [{}]: closed", session);
        return Ok(());
    }

    let (frame_type, len) = ws.recv(&mut [])?;
    if len > LINE_CAPACITY + 1 {
        warn!("WebSocket [{}]: {}-byte frame rejected", session, len);
        ws.send(FrameType::Close, &[])?;
        return Err(EspError::from_infallible::<ESP_ERR_INVALID_SIZE>());
    }

    let mut buf = [0u8; LINE_CAPACITY + 1];
    ws.recv(&mut buf[..len])?;

    if let FrameType::Text(_) = frame_type {
        match core::str::from_utf8(&buf[..len]) {
            Ok(text) => {
                let line = text.trim_end_matches('\0');
                let _ = submit_line(inbound, ConnectionId(session), line);
            }
            Err(_) => warn!("WebSocket [{}]: non UTF-8 frame ignored", session),
        }
    }
    Ok(())
}
