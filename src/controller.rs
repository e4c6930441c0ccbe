//! The session orchestrator.

use crate::channel::{endpoint, ChannelPayload, ChannelState, Connector, StreamChannel};
use crate::config::Config;
use crate::consts::{INITIAL_STATUS, READY_STATUS};
use crate::error::RequestError;
use crate::event::{ChannelEvent, EventRx, EventTx, SamplePayload, SessionEvent};
use crate::requester::{PendingRequest, RecommendationApi, RecommendationRequester, RequestId};
use crate::sampler::{MediaSampler, SamplerHandle};
use crate::types::{Filters, Item, Modality, MoodLabel, RecommendationKind, RecommendationResult, SessionState};
use crate::utils::{AudioChunk, CaptureDevice, EncodedFrame};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Runtime pieces of one enabled signal. Dropping it stops both.
struct ChannelHandle<P> {
    channel: StreamChannel<P>,
    sampler: SamplerHandle,
}

impl<P: ChannelPayload> ChannelHandle<P> {
    #[allow(clippy::too_many_arguments)]
    fn start<C>(
        modality: Modality,
        generation: u64,
        device: &mut dyn CaptureDevice<P>,
        connector: Arc<C>,
        url: String,
        cadence: Duration,
        events: EventTx,
        wrap: fn(P) -> SamplePayload,
    ) -> anyhow::Result<Self>
    where
        C: Connector + ?Sized + 'static,
    {
        let source = device.open()?;

        let mut channel = StreamChannel::new(modality, generation);
        channel.open(connector, url, events.clone());

        let sampler = MediaSampler::start(cadence, source, move |payload| {
            let _ = events.send(SessionEvent::Sample {
                modality,
                generation,
                payload: wrap(payload),
            });
        });

        Ok(Self { channel, sampler })
    }
}

impl<P> ChannelHandle<P> {
    /// Sampler first, so no tick can race the channel going away.
    fn stop(&mut self) {
        self.sampler.stop();
        self.channel.close();
    }
}

/// Owns the session state, both analysis channels and the authoritative
/// recommendation request.
///
/// All state changes happen on the caller's task: background work only posts
/// [`SessionEvent`]s, which are applied by [`MoodFusionController::pump`] or
/// [`MoodFusionController::drain`].
pub struct MoodFusionController<C: ?Sized, A: ?Sized> {
    config: Config,
    connector: Arc<C>,
    requester: RecommendationRequester<A>,
    face_device: Box<dyn CaptureDevice<EncodedFrame>>,
    voice_device: Box<dyn CaptureDevice<AudioChunk>>,
    state: SessionState,
    face: Option<ChannelHandle<EncodedFrame>>,
    voice: Option<ChannelHandle<AudioChunk>>,
    generation: u64,
    events_tx: EventTx,
    events_rx: EventRx,
    kind: RecommendationKind,
    pending: Option<PendingRequest>,
    detected_mood: Option<MoodLabel>,
    results: Vec<Item>,
    status: String,
}

impl<C, A> MoodFusionController<C, A>
where
    C: Connector + ?Sized + 'static,
    A: RecommendationApi + ?Sized + 'static,
{
    pub fn new(
        config: Config,
        connector: Arc<C>,
        api: Arc<A>,
        face_device: impl CaptureDevice<EncodedFrame> + 'static,
        voice_device: impl CaptureDevice<AudioChunk> + 'static,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            config,
            connector,
            requester: RecommendationRequester::new(api),
            face_device: Box::new(face_device),
            voice_device: Box::new(voice_device),
            state: SessionState::new(),
            face: None,
            voice: None,
            generation: 0,
            events_tx,
            events_rx,
            kind: RecommendationKind::default(),
            pending: None,
            detected_mood: None,
            results: Vec::new(),
            status: INITIAL_STATUS.to_string(),
        }
    }

    pub fn set_face_enabled(&mut self, enabled: bool) {
        self.set_enabled(Modality::Face, enabled);
    }

    pub fn set_voice_enabled(&mut self, enabled: bool) {
        self.set_enabled(Modality::Voice, enabled);
    }

    /// Switches one signal on or off. Repeating the current value does nothing.
    pub fn set_enabled(&mut self, modality: Modality, enabled: bool) {
        if self.state.is_enabled(modality) == enabled {
            tracing::debug!("{} already {}", modality, if enabled { "enabled" } else { "disabled" });
            return;
        }
        if enabled {
            self.enable(modality);
        } else {
            self.disable(modality);
        }
    }

    fn enable(&mut self, modality: Modality) {
        self.generation += 1;
        let generation = self.generation;
        self.state.enable(modality);

        let url = self.config.stream_url(endpoint(modality));
        let connector = Arc::clone(&self.connector);
        let events = self.events_tx.clone();
        tracing::info!("enabling {} (generation {})", modality, generation);

        let started = match modality {
            Modality::Face => ChannelHandle::start(
                modality,
                generation,
                self.face_device.as_mut(),
                connector,
                url,
                self.config.frame_cadence(),
                events,
                SamplePayload::Frame,
            )
            .map(|handle| self.face = Some(handle)),
            Modality::Voice => ChannelHandle::start(
                modality,
                generation,
                self.voice_device.as_mut(),
                connector,
                url,
                self.config.audio_cadence(),
                events,
                SamplePayload::Audio,
            )
            .map(|handle| self.voice = Some(handle)),
        };

        if let Err(e) = started {
            tracing::error!("could not open {} capture device: {:#}", modality, e);
            self.state.set_mood(modality, MoodLabel::Error);
        }
    }

    fn disable(&mut self, modality: Modality) {
        tracing::info!("disabling {}", modality);
        match modality {
            Modality::Face => {
                if let Some(mut handle) = self.face.take() {
                    handle.stop();
                }
            }
            Modality::Voice => {
                if let Some(mut handle) = self.voice.take() {
                    handle.stop();
                }
            }
        }
        self.state.disable(modality);
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.state.set_text(text);
    }

    /// A copy of the current session state.
    pub fn session_snapshot(&self) -> SessionState {
        self.state.clone()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn kind(&self) -> RecommendationKind {
        self.kind
    }

    /// Switches between movies and games. Results of the previous kind are
    /// discarded and any request still in flight is ignored.
    pub fn set_kind(&mut self, kind: RecommendationKind) {
        if self.kind == kind {
            return;
        }
        tracing::info!("switching recommendations to {}", kind);
        self.kind = kind;
        self.cancel_pending();
        self.results.clear();
        self.detected_mood = None;
        self.status = READY_STATUS.to_string();
    }

    /// Submits a request built from the current state. It becomes the only
    /// request whose outcome is applied.
    pub fn request_recommendations(&mut self, filters: &Filters) -> RequestId {
        self.cancel_pending();
        self.results.clear();
        self.detected_mood = None;
        self.status = format!("Finding {}...", self.kind);

        let events = self.events_tx.clone();
        let pending = self
            .requester
            .submit(&self.state, filters, self.kind, move |id, outcome| {
                let _ = events.send(SessionEvent::Recommendation { id, outcome });
            });
        let id = pending.id();
        self.pending = Some(pending);
        id
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Results of the last successful request, in server order.
    pub fn results(&self) -> &[Item] {
        &self.results
    }

    pub fn detected_mood(&self) -> Option<MoodLabel> {
        self.detected_mood
    }

    pub fn channel_state(&self, modality: Modality) -> Option<ChannelState> {
        match modality {
            Modality::Face => self.face.as_ref().map(|h| h.channel.state()),
            Modality::Voice => self.voice.as_ref().map(|h| h.channel.state()),
        }
    }

    /// Samples sent on the current channel of `modality`, 0 when there is none.
    pub fn sent_count(&self, modality: Modality) -> u64 {
        match modality {
            Modality::Face => self.face.as_ref().map_or(0, |h| h.channel.sent_count()),
            Modality::Voice => self.voice.as_ref().map_or(0, |h| h.channel.sent_count()),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        self.requester.api()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Waits for the next event and applies it. Cancel safe.
    pub async fn pump(&mut self) {
        // The controller holds a sender, so the queue never closes.
        if let Some(event) = self.events_rx.recv().await {
            self.handle_event(event);
        }
    }

    /// Applies every event already queued and returns how many there were.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Channel {
                modality,
                generation,
                event,
            } => self.on_channel_event(modality, generation, event),
            SessionEvent::Sample {
                modality,
                generation,
                payload,
            } => self.on_sample(modality, generation, payload),
            SessionEvent::Recommendation { id, outcome } => self.on_recommendation(id, outcome),
        }
    }

    fn on_channel_event(&mut self, modality: Modality, generation: u64, event: ChannelEvent) {
        let applied = match modality {
            Modality::Face => apply_channel_event(&mut self.face, generation, event),
            Modality::Voice => apply_channel_event(&mut self.voice, generation, event),
        };
        match applied {
            None => tracing::warn!("dropping stale {} channel event (generation {})", modality, generation),
            Some(Some(label)) => {
                self.state.set_mood(modality, label);
            }
            Some(None) => {}
        }
    }

    fn on_sample(&mut self, modality: Modality, generation: u64, payload: SamplePayload) {
        let sent = match (modality, payload) {
            (Modality::Face, SamplePayload::Frame(frame)) => send_sample(&mut self.face, generation, frame),
            (Modality::Voice, SamplePayload::Audio(chunk)) => send_sample(&mut self.voice, generation, chunk),
            (modality, payload) => {
                tracing::error!("{:?} sample routed to {} channel", payload, modality);
                None
            }
        };
        if sent.is_none() {
            tracing::trace!("dropping stale {} sample (generation {})", modality, generation);
        }
    }

    fn on_recommendation(&mut self, id: RequestId, outcome: Result<RecommendationResult, RequestError>) {
        if self.pending.as_ref().map(PendingRequest::id) != Some(id) {
            tracing::warn!("ignoring outcome of superseded request {}", id);
            return;
        }
        self.pending = None;
        match outcome {
            Ok(result) => {
                let mood = result.detected_mood();
                self.status = format!("Success! Detected mood is '{}'.", mood);
                self.detected_mood = Some(mood);
                self.results = result.into_items();
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.results.clear();
            }
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.requester.cancel(&pending);
        }
    }
}

impl<C: ?Sized, A: ?Sized> MoodFusionController<C, A> {
    /// Stops both signals and the pending request. Safe to call from any state,
    /// any number of times.
    pub fn teardown(&mut self) {
        if let Some(mut handle) = self.face.take() {
            handle.stop();
        }
        if let Some(mut handle) = self.voice.take() {
            handle.stop();
        }
        self.state.disable(Modality::Face);
        self.state.disable(Modality::Voice);
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
    }
}

impl<C: ?Sized, A: ?Sized> Drop for MoodFusionController<C, A> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Returns `None` when `generation` does not match the live channel.
fn apply_channel_event<P: ChannelPayload>(
    slot: &mut Option<ChannelHandle<P>>,
    generation: u64,
    event: ChannelEvent,
) -> Option<Option<MoodLabel>> {
    let handle = slot.as_mut().filter(|h| h.channel.generation() == generation)?;
    let label = handle.channel.apply(event);
    if matches!(handle.channel.state(), ChannelState::Failed | ChannelState::Closed) {
        // The channel never reopens on its own; its samples have nowhere to go.
        handle.sampler.stop();
    }
    Some(label)
}

fn send_sample<P: ChannelPayload>(slot: &mut Option<ChannelHandle<P>>, generation: u64, payload: P) -> Option<bool> {
    let handle = slot.as_mut().filter(|h| h.channel.generation() == generation)?;
    Some(handle.channel.send(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChannelError;
    use crate::requester::MockRecommendationApi;
    use crate::testing::{FakeConnector, MissingDevice, StillCamera};
    use crate::types::Sentiment;
    use crate::utils::{audio_tap, AudioFeed};
    use serde_json::json;
    use tokio_tungstenite::tungstenite::Message;

    type TestController = MoodFusionController<FakeConnector, MockRecommendationApi>;

    fn config() -> Config {
        Config::builder().with_base_url("http://mood.test").build()
    }

    fn controller(connector: &Arc<FakeConnector>, api: MockRecommendationApi) -> (TestController, AudioFeed) {
        let camera = StillCamera::jpeg(&[0xff, 0xd8, 0xff]);
        let (feed, tap) = audio_tap(16_000, 16_000);
        let controller = MoodFusionController::new(config(), Arc::clone(connector), Arc::new(api), camera, tap);
        (controller, feed)
    }

    async fn pump_until(ctrl: &mut TestController, mut done: impl FnMut(&TestController) -> bool) {
        tokio::time::timeout(Duration::from_secs(30), async {
            while !done(ctrl) {
                ctrl.pump().await;
            }
        })
        .await
        .expect("condition not reached");
    }

    fn angry() -> MoodLabel {
        MoodLabel::Detected(Sentiment::Angry)
    }

    #[tokio::test]
    async fn rapid_reenable_opens_a_single_connection() {
        let connector = FakeConnector::new();
        let (mut ctrl, _feed) = controller(&connector, MockRecommendationApi::new());

        ctrl.set_face_enabled(true);
        ctrl.set_face_enabled(true);
        ctrl.set_face_enabled(false);
        ctrl.set_face_enabled(true);

        pump_until(&mut ctrl, |c| c.channel_state(Modality::Face) == Some(ChannelState::Open)).await;
        assert_eq!(connector.connect_count(), 1);
        assert_eq!(connector.take_remote().url, "ws://mood.test/ws/analyze_face");
    }

    #[tokio::test]
    async fn reenable_resets_label_to_connecting() {
        let connector = FakeConnector::new();
        let (mut ctrl, _feed) = controller(&connector, MockRecommendationApi::new());

        ctrl.set_face_enabled(true);
        assert_eq!(ctrl.session_snapshot().face_mood(), MoodLabel::Connecting);
        pump_until(&mut ctrl, |c| c.channel_state(Modality::Face) == Some(ChannelState::Open)).await;

        let remote = connector.take_remote();
        remote.inbound.send(Ok(Message::Text("angry".to_string()))).await.unwrap();
        pump_until(&mut ctrl, |c| c.session_snapshot().face_mood() == angry()).await;

        ctrl.set_face_enabled(false);
        assert_eq!(ctrl.session_snapshot().face_mood(), MoodLabel::Unset);
        ctrl.set_face_enabled(true);
        assert_eq!(ctrl.session_snapshot().face_mood(), MoodLabel::Connecting);

        // A late label from the old connection must not land on the new one.
        let _ = remote.inbound.send(Ok(Message::Text("sad".to_string()))).await;
        pump_until(&mut ctrl, |c| c.channel_state(Modality::Face) == Some(ChannelState::Open)).await;
        ctrl.drain();
        assert_eq!(ctrl.session_snapshot().face_mood(), MoodLabel::Connecting);
    }

    #[tokio::test(start_paused = true)]
    async fn no_sends_after_disable() {
        let connector = FakeConnector::new();
        let (mut ctrl, _feed) = controller(&connector, MockRecommendationApi::new());

        ctrl.set_face_enabled(true);
        pump_until(&mut ctrl, |c| c.channel_state(Modality::Face) == Some(ChannelState::Open)).await;
        let mut remote = connector.take_remote();

        pump_until(&mut ctrl, |c| c.sent_count(Modality::Face) >= 2).await;
        remote.inbound.send(Ok(Message::Text("angry".to_string()))).await.unwrap();
        pump_until(&mut ctrl, |c| c.session_snapshot().face_mood() == angry()).await;

        let frozen = ctrl.sent_count(Modality::Face);
        ctrl.set_face_enabled(false);
        assert_eq!(ctrl.session_snapshot().face_mood(), MoodLabel::Unset);
        assert!(!ctrl.session_snapshot().face_enabled());

        tokio::time::sleep(Duration::from_secs(10)).await;
        ctrl.drain();

        let mut delivered = 0;
        while let Some(message) = remote.sent.recv().await {
            assert!(matches!(message, Message::Text(ref frame) if frame.starts_with("data:image/jpeg;base64,")));
            delivered += 1;
        }
        assert_eq!(delivered, frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn voice_sends_binary_chunks_only_while_enabled() {
        let connector = FakeConnector::new();
        let (mut ctrl, mut feed) = controller(&connector, MockRecommendationApi::new());

        ctrl.set_voice_enabled(true);
        pump_until(&mut ctrl, |c| c.channel_state(Modality::Voice) == Some(ChannelState::Open)).await;
        let mut remote = connector.take_remote();
        assert_eq!(remote.url, "ws://mood.test/ws/analyze_voice");

        assert_eq!(feed.push(&[0.1; 800]), 0);
        pump_until(&mut ctrl, |c| c.sent_count(Modality::Voice) == 1).await;
        match remote.sent.recv().await {
            Some(Message::Binary(chunk)) => assert_eq!(&chunk[..4], b"RIFF"),
            other => panic!("expected a wav chunk, got {:?}", other),
        }

        // Turning voice off stops recording altogether.
        ctrl.set_voice_enabled(false);
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!feed.is_armed());
        assert_eq!(feed.push(&vec![0.1; 64_000]), 0);
    }

    #[tokio::test]
    async fn face_failure_leaves_voice_untouched() {
        let connector = FakeConnector::new();
        let (mut ctrl, _feed) = controller(&connector, MockRecommendationApi::new());
        ctrl.set_text("long day");

        ctrl.set_face_enabled(true);
        pump_until(&mut ctrl, |c| c.channel_state(Modality::Face) == Some(ChannelState::Open)).await;
        let face = connector.take_remote();
        ctrl.set_voice_enabled(true);
        pump_until(&mut ctrl, |c| c.channel_state(Modality::Voice) == Some(ChannelState::Open)).await;
        let voice = connector.take_remote();

        face.inbound
            .send(Err(ChannelError::Transport("connection reset".to_string())))
            .await
            .unwrap();
        pump_until(&mut ctrl, |c| c.session_snapshot().face_mood() == MoodLabel::Error).await;

        voice.inbound.send(Ok(Message::Text("calm".to_string()))).await.unwrap();
        pump_until(&mut ctrl, |c| c.session_snapshot().voice_mood() == MoodLabel::Detected(Sentiment::Calm)).await;

        let snapshot = ctrl.session_snapshot();
        assert!(snapshot.face_enabled());
        assert_eq!(ctrl.channel_state(Modality::Face), Some(ChannelState::Failed));
        assert_eq!(ctrl.channel_state(Modality::Voice), Some(ChannelState::Open));
        assert_eq!(snapshot.text(), "long day");
        assert_eq!(connector.connect_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn refused_connection_is_not_retried() {
        let connector = FakeConnector::new();
        connector.refuse_connections(true);
        let (mut ctrl, _feed) = controller(&connector, MockRecommendationApi::new());

        ctrl.set_face_enabled(true);
        pump_until(&mut ctrl, |c| c.session_snapshot().face_mood() == MoodLabel::Error).await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        ctrl.drain();
        assert!(ctrl.session_snapshot().face_enabled());
        assert_eq!(connector.connect_count(), 1);
        assert_eq!(ctrl.sent_count(Modality::Face), 0);
    }

    #[tokio::test]
    async fn missing_device_marks_the_signal_as_failed() {
        let connector = FakeConnector::new();
        let (_feed, tap) = audio_tap(1024, 16_000);
        let mut ctrl: TestController = MoodFusionController::new(
            config(),
            Arc::clone(&connector),
            Arc::new(MockRecommendationApi::new()),
            MissingDevice,
            tap,
        );

        ctrl.set_face_enabled(true);
        let snapshot = ctrl.session_snapshot();
        assert!(snapshot.face_enabled());
        assert_eq!(snapshot.face_mood(), MoodLabel::Error);
        assert_eq!(ctrl.channel_state(Modality::Face), None);

        ctrl.set_face_enabled(false);
        assert_eq!(ctrl.session_snapshot().face_mood(), MoodLabel::Unset);
        assert_eq!(connector.connect_count(), 0);
    }

    #[tokio::test]
    async fn request_without_channels_sends_text_only() {
        let mut api = MockRecommendationApi::new();
        api.expect_recommend()
            .withf(|request| {
                serde_json::to_value(request).unwrap() == json!({ "text": "fun adventure", "exclude_genres": [] })
                    && request.kind() == RecommendationKind::Movies
            })
            .times(1)
            .returning(|_| {
                let item = Item::from_value(RecommendationKind::Movies, json!({ "id": 1, "title": "Up" })).unwrap();
                Ok(RecommendationResult::new(MoodLabel::Detected(Sentiment::Happy), vec![item]))
            });
        let connector = FakeConnector::new();
        let (mut ctrl, _feed) = controller(&connector, api);

        ctrl.set_text("fun adventure");
        ctrl.request_recommendations(&Filters::new());
        assert_eq!(ctrl.status(), "Finding movies...");
        assert!(ctrl.is_loading());

        pump_until(&mut ctrl, |c| !c.is_loading()).await;
        assert_eq!(ctrl.status(), "Success! Detected mood is 'happy'.");
        assert_eq!(ctrl.detected_mood(), Some(MoodLabel::Detected(Sentiment::Happy)));
        assert_eq!(ctrl.results().len(), 1);
        assert_eq!(ctrl.results()[0].id(), 1);
    }

    #[tokio::test]
    async fn request_with_face_only_survives_disabling_face() {
        let mut api = MockRecommendationApi::new();
        api.expect_recommend()
            .withf(|request| {
                request.face_mood() == Some(MoodLabel::Detected(Sentiment::Angry))
                    && request.voice_mood().is_none()
                    && request.exclude_genres() == [27]
            })
            .times(1)
            .returning(|_| Ok(RecommendationResult::new(MoodLabel::Detected(Sentiment::Angry), vec![])));
        let connector = FakeConnector::new();
        let (mut ctrl, _feed) = controller(&connector, api);

        ctrl.set_face_enabled(true);
        pump_until(&mut ctrl, |c| c.channel_state(Modality::Face) == Some(ChannelState::Open)).await;
        let remote = connector.take_remote();
        remote.inbound.send(Ok(Message::Text("angry".to_string()))).await.unwrap();
        pump_until(&mut ctrl, |c| c.session_snapshot().face_mood() == angry()).await;

        ctrl.request_recommendations(&Filters::new().with_excluded_genre(27));
        ctrl.set_face_enabled(false);

        pump_until(&mut ctrl, |c| !c.is_loading()).await;
        assert_eq!(ctrl.status(), "Success! Detected mood is 'angry'.");
    }

    #[tokio::test]
    async fn explicit_error_becomes_the_status() {
        let mut api = MockRecommendationApi::new();
        api.expect_recommend()
            .times(1)
            .returning(|_| Err(RequestError::Failed("bad mood".to_string())));
        let connector = FakeConnector::new();
        let (mut ctrl, _feed) = controller(&connector, api);

        ctrl.request_recommendations(&Filters::new());
        pump_until(&mut ctrl, |c| !c.is_loading()).await;
        assert_eq!(ctrl.status(), "Error: bad mood");
        assert!(ctrl.results().is_empty());
    }

    #[tokio::test]
    async fn switching_kind_discards_the_in_flight_result() {
        let mut api = MockRecommendationApi::new();
        api.expect_recommend().times(1).returning(|_| {
            let item = Item::from_value(RecommendationKind::Movies, json!({ "id": 7 })).unwrap();
            Ok(RecommendationResult::new(MoodLabel::Detected(Sentiment::Happy), vec![item]))
        });
        let connector = FakeConnector::new();
        let (mut ctrl, _feed) = controller(&connector, api);

        ctrl.request_recommendations(&Filters::new());
        // Let the request finish so its outcome is already queued.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        ctrl.set_kind(RecommendationKind::Games);
        ctrl.drain();

        assert_eq!(ctrl.kind(), RecommendationKind::Games);
        assert_eq!(ctrl.status(), "Ready.");
        assert!(ctrl.results().is_empty());
        assert!(!ctrl.is_loading());
    }

    #[tokio::test]
    async fn newer_request_supersedes_older_one() {
        let mut api = MockRecommendationApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_recommend()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(RecommendationResult::new(MoodLabel::Detected(Sentiment::Sad), vec![])));
        api.expect_recommend()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(RecommendationResult::new(MoodLabel::Detected(Sentiment::Happy), vec![])));
        let connector = FakeConnector::new();
        let (mut ctrl, _feed) = controller(&connector, api);

        ctrl.request_recommendations(&Filters::new());
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        let latest = ctrl.request_recommendations(&Filters::new());
        assert_eq!(latest.to_string(), "#2");

        pump_until(&mut ctrl, |c| !c.is_loading()).await;
        assert_eq!(ctrl.status(), "Success! Detected mood is 'happy'.");
    }

    #[tokio::test]
    async fn teardown_from_any_state() {
        let connector = FakeConnector::new();
        let (mut ctrl, _feed) = controller(&connector, MockRecommendationApi::new());
        ctrl.teardown();

        ctrl.set_face_enabled(true);
        ctrl.set_voice_enabled(true);
        pump_until(&mut ctrl, |c| c.channel_state(Modality::Face) == Some(ChannelState::Open)).await;
        ctrl.teardown();
        ctrl.teardown();

        let snapshot = ctrl.session_snapshot();
        assert!(!snapshot.face_enabled());
        assert!(!snapshot.voice_enabled());
        assert_eq!(snapshot.face_mood(), MoodLabel::Unset);
        assert_eq!(snapshot.voice_mood(), MoodLabel::Unset);
        assert_eq!(ctrl.channel_state(Modality::Face), None);
    }
}
