pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

pub const FACE_ENDPOINT: &str = "/ws/analyze_face";
pub const VOICE_ENDPOINT: &str = "/ws/analyze_voice";

pub const TUNNEL_BYPASS_HEADER: &str = "ngrok-skip-browser-warning";
pub const TUNNEL_BYPASS_VALUE: &str = "69420";

pub const FRAME_CADENCE_MS: u64 = 1500;
pub const AUDIO_CADENCE_MS: u64 = 2000;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Outbound frames buffered per channel before new samples are dropped.
pub const CHANNEL_CAPACITY: usize = 8;

/// Items shown per result list; the server order is preserved.
pub const DISPLAY_LIMIT: usize = 10;
pub const REVIEW_PREVIEW_LIMIT: usize = 3;
pub const REVIEW_EXCERPT_CHARS: usize = 400;

pub const INITIAL_STATUS: &str = "Ready. Select your inputs and get recommendations.";
pub const READY_STATUS: &str = "Ready.";
