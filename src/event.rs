use crate::error::{ChannelError, RequestError};
use crate::requester::RequestId;
use crate::types::{Modality, RecommendationResult};
use crate::utils::{AudioChunk, EncodedFrame};
use tokio_tungstenite::tungstenite::Message;

pub type EventTx = tokio::sync::mpsc::UnboundedSender<SessionEvent>;
pub type EventRx = tokio::sync::mpsc::UnboundedReceiver<SessionEvent>;

/// Everything that can change session state. Background tasks only post
/// these; the controller applies them one at a time.
#[derive(Debug)]
pub enum SessionEvent {
    Channel {
        modality: Modality,
        generation: u64,
        event: ChannelEvent,
    },
    Sample {
        modality: Modality,
        generation: u64,
        payload: SamplePayload,
    },
    Recommendation {
        id: RequestId,
        outcome: Result<RecommendationResult, RequestError>,
    },
}

#[derive(Debug)]
pub enum ChannelEvent {
    /// Handshake completed; carries the writer for outbound samples.
    Opened(tokio::sync::mpsc::Sender<Message>),
    /// A text message from the analysis service.
    Label(String),
    Failed(ChannelError),
    /// The remote side closed the stream.
    Ended,
}

#[derive(Debug)]
pub enum SamplePayload {
    Frame(EncodedFrame),
    Audio(AudioChunk),
}
