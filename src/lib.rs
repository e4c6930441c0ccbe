pub mod channel;
pub mod config;
pub mod consts;
pub mod controller;
pub mod discover;
pub mod error;
pub mod event;
mod guard;
pub mod requester;
pub mod sampler;

#[cfg(test)]
mod testing;

pub use moodcast_types as types;
pub use moodcast_utils as utils;

pub use channel::{ChannelState, Connector, StreamChannel, WsConnector};
pub use config::{Config, ConfigBuilder};
pub use controller::MoodFusionController;
pub use error::{ChannelError, ConfigError, RequestError};
pub use requester::{HttpRecommendationApi, PendingRequest, RecommendationApi, RecommendationRequester, RequestId};
pub use sampler::{MediaSampler, SamplerHandle};
