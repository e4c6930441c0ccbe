//! Reconnectable duplex channels to the analysis service.
//!
//! One generic [`StreamChannel`] serves both signals; the face and voice
//! instances differ only in endpoint and payload encoding.

use crate::consts::{FACE_ENDPOINT, VOICE_ENDPOINT};
use crate::event::{ChannelEvent, EventTx, SessionEvent};
use crate::types::{Modality, MoodLabel};
use crate::utils::{AudioChunk, EncodedFrame};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

mod connector;

pub use connector::{Connector, Inbound, Link, WsConnector};

/// How a sample travels over the wire.
pub trait ChannelPayload: Send + 'static {
    fn into_message(self) -> Message;
}

/// Frames go out as text (`data:` URLs).
impl ChannelPayload for EncodedFrame {
    fn into_message(self) -> Message {
        Message::Text(self)
    }
}

/// Audio chunks go out as binary messages.
impl ChannelPayload for AudioChunk {
    fn into_message(self) -> Message {
        Message::Binary(self)
    }
}

pub fn endpoint(modality: Modality) -> &'static str {
    match modality {
        Modality::Face => FACE_ENDPOINT,
        Modality::Voice => VOICE_ENDPOINT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Idle,
    Connecting,
    Open,
    Closed,
    Failed,
}

/// One analysis channel: `Idle -> Connecting -> Open -> {Closed | Failed}`.
///
/// The connection runs on a background task that reports through the
/// session event queue, tagged with this channel's generation. State only
/// changes in [`StreamChannel::apply`], called by the queue's owner.
pub struct StreamChannel<P> {
    modality: Modality,
    generation: u64,
    state: ChannelState,
    last_label: Option<MoodLabel>,
    outbound: Option<mpsc::Sender<Message>>,
    task: Option<JoinHandle<()>>,
    sent: u64,
    _payload: PhantomData<fn(P)>,
}

impl<P> StreamChannel<P> {
    pub fn new(modality: Modality, generation: u64) -> Self {
        Self {
            modality,
            generation,
            state: ChannelState::Idle,
            last_label: None,
            outbound: None,
            task: None,
            sent: 0,
            _payload: PhantomData,
        }
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn last_label(&self) -> Option<MoodLabel> {
        self.last_label
    }

    /// Number of samples handed to the transport so far.
    pub fn sent_count(&self) -> u64 {
        self.sent
    }

    /// Moves to `Closed` and releases the connection. Idempotent.
    pub fn close(&mut self) {
        self.outbound = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if self.state != ChannelState::Closed {
            tracing::info!("{} channel closed (generation {})", self.modality, self.generation);
            self.state = ChannelState::Closed;
        }
    }
}

impl<P: ChannelPayload> StreamChannel<P> {
    /// Starts connecting to `url`. Only valid from `Idle`.
    pub fn open<C>(&mut self, connector: Arc<C>, url: String, events: EventTx)
    where
        C: Connector + ?Sized + 'static,
    {
        if self.state != ChannelState::Idle {
            tracing::warn!("{} channel already used, not reopening", self.modality);
            return;
        }
        self.state = ChannelState::Connecting;

        let (modality, generation) = (self.modality, self.generation);
        let post = move |event: ChannelEvent| {
            events
                .send(SessionEvent::Channel {
                    modality,
                    generation,
                    event,
                })
                .is_ok()
        };

        tracing::debug!("opening {} channel to {}", modality, url);
        self.task = Some(tokio::spawn(async move {
            let Link {
                outbound,
                mut inbound,
            } = match connector.connect(&url).await {
                Ok(link) => link,
                Err(e) => {
                    post(ChannelEvent::Failed(e));
                    return;
                }
            };
            if !post(ChannelEvent::Opened(outbound)) {
                return;
            }

            while let Some(message) = inbound.recv().await {
                let event = match message {
                    Ok(Message::Text(text)) => ChannelEvent::Label(text),
                    Ok(Message::Close(reason)) => {
                        tracing::info!("{} connection closed: {:?}", modality, reason);
                        break;
                    }
                    Ok(Message::Binary(bin)) => {
                        tracing::warn!("unexpected binary message on {} channel: {} bytes", modality, bin.len());
                        continue;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        post(ChannelEvent::Failed(e));
                        return;
                    }
                };
                if !post(event) {
                    return;
                }
            }
            post(ChannelEvent::Ended);
        }));
    }

    /// Applies one connection event and returns the label the session
    /// should take on, if any.
    pub fn apply(&mut self, event: ChannelEvent) -> Option<MoodLabel> {
        match event {
            ChannelEvent::Opened(outbound) => {
                match self.state {
                    ChannelState::Connecting => {
                        tracing::info!("{} channel open (generation {})", self.modality, self.generation);
                        self.state = ChannelState::Open;
                    }
                    // A label got here before the handshake event.
                    ChannelState::Open if self.outbound.is_none() => {}
                    _ => return None,
                }
                self.outbound = Some(outbound);
                None
            }
            ChannelEvent::Label(text) => {
                match self.state {
                    ChannelState::Connecting => self.state = ChannelState::Open,
                    ChannelState::Open => {}
                    _ => return None,
                }
                match text.parse::<MoodLabel>() {
                    Ok(label @ MoodLabel::Detected(_)) => {
                        tracing::debug!("{} mood: {}", self.modality, label);
                        self.last_label = Some(label);
                        Some(label)
                    }
                    _ => {
                        tracing::warn!("ignoring unrecognised {} label: {:?}", self.modality, text);
                        None
                    }
                }
            }
            ChannelEvent::Failed(e) => {
                if matches!(self.state, ChannelState::Closed | ChannelState::Failed) {
                    return None;
                }
                tracing::error!("{} channel failed: {}", self.modality, e);
                self.state = ChannelState::Failed;
                self.outbound = None;
                Some(MoodLabel::Error)
            }
            ChannelEvent::Ended => {
                if matches!(self.state, ChannelState::Connecting | ChannelState::Open) {
                    tracing::info!("{} channel ended by remote", self.modality);
                    self.state = ChannelState::Closed;
                    self.outbound = None;
                }
                None
            }
        }
    }

    /// Hands a sample to the transport. Outside `Open` this is a silent
    /// no-op: nothing is queued for later. Returns whether it was sent.
    pub fn send(&mut self, payload: P) -> bool {
        if self.state != ChannelState::Open {
            tracing::trace!("{} channel not open, dropping sample", self.modality);
            return false;
        }
        let Some(outbound) = &self.outbound else {
            return false;
        };
        match outbound.try_send(payload.into_message()) {
            Ok(()) => {
                self.sent += 1;
                tracing::debug!("sent {} sample #{}", self.modality, self.sent);
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!("{} channel backlogged, dropping sample", self.modality);
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("{} writer gone, dropping sample", self.modality);
                false
            }
        }
    }
}

impl<P> Drop for StreamChannel<P> {
    fn drop(&mut self) {
        self.close();
    }
}
