use crate::genre::GenreId;
use crate::mood::{MoodLabel, Sentiment};
use crate::session::{Modality, SessionState};
use std::collections::BTreeSet;
use std::fmt;

const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    #[default]
    Movies,
    Games,
}

impl RecommendationKind {
    /// Path of the catalog endpoint serving this kind.
    pub fn path(&self) -> &'static str {
        match self {
            RecommendationKind::Movies => "/get_recommendations",
            RecommendationKind::Games => "/get_game_recommendations",
        }
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationKind::Movies => f.write_str("movies"),
            RecommendationKind::Games => f.write_str("games"),
        }
    }
}

/// User-selected catalog options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    exclude_genres: BTreeSet<GenreId>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_excluded_genre(mut self, id: GenreId) -> Self {
        self.exclude_genres.insert(id);
        self
    }

    /// Flips the selection of `id`; returns whether it is now selected.
    pub fn toggle_genre(&mut self, id: GenreId) -> bool {
        if self.exclude_genres.remove(&id) {
            false
        } else {
            self.exclude_genres.insert(id)
        }
    }

    pub fn is_excluded(&self, id: GenreId) -> bool {
        self.exclude_genres.contains(&id)
    }

    pub fn exclude_genres(&self) -> &BTreeSet<GenreId> {
        &self.exclude_genres
    }
}

/// Body of one catalog request, frozen at submission time.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RecommendationRequest {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    face_mood: Option<MoodLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_mood: Option<MoodLabel>,
    exclude_genres: Vec<GenreId>,
    #[serde(skip)]
    kind: RecommendationKind,
}

impl RecommendationRequest {
    /// Text is always carried verbatim; a mood label only travels when its
    /// signal was enabled in the snapshot.
    pub fn from_snapshot(snapshot: &SessionState, filters: &Filters, kind: RecommendationKind) -> Self {
        Self {
            text: snapshot.text().to_string(),
            face_mood: snapshot.reported_mood(Modality::Face),
            voice_mood: snapshot.reported_mood(Modality::Voice),
            exclude_genres: filters.exclude_genres().iter().copied().collect(),
            kind,
        }
    }

    /// A request seeded from a single mood, as used by the curated rows.
    pub fn for_mood(mood: Sentiment, kind: RecommendationKind) -> Self {
        Self {
            text: String::new(),
            face_mood: Some(MoodLabel::Detected(mood)),
            voice_mood: None,
            exclude_genres: Vec::new(),
            kind,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn face_mood(&self) -> Option<MoodLabel> {
        self.face_mood
    }

    pub fn voice_mood(&self) -> Option<MoodLabel> {
        self.voice_mood
    }

    pub fn exclude_genres(&self) -> &[GenreId] {
        &self.exclude_genres
    }

    pub fn kind(&self) -> RecommendationKind {
        self.kind
    }
}

/// Response body as sent by the catalog service.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RecommendationResponse {
    pub mood: Option<String>,
    pub recommendations: Option<Vec<serde_json::Value>>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingScale {
    OutOfTen,
    OutOfFive,
}

impl RatingScale {
    pub fn max(&self) -> u8 {
        match self {
            RatingScale::OutOfTen => 10,
            RatingScale::OutOfFive => 5,
        }
    }
}

/// A rating together with its scale. Movie and game ratings are not
/// comparable, so there is deliberately no ordering between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    value: f64,
    scale: RatingScale,
}

impl Rating {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn scale(&self) -> RatingScale {
        self.scale
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} / {}", self.value, self.scale.max())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WatchProvider {
    provider_id: u64,
    #[serde(default)]
    provider_name: String,
    #[serde(default)]
    logo_path: Option<String>,
}

impl WatchProvider {
    pub fn provider_id(&self) -> u64 {
        self.provider_id
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn logo_url(&self) -> Option<String> {
        self.logo_path.as_ref().map(|path| format!("{TMDB_IMAGE_BASE}/w45{path}"))
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Movie {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    vote_average: Option<f64>,
    #[serde(default)]
    watch_providers: Vec<WatchProvider>,
}

impl Movie {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn overview(&self) -> Option<&str> {
        self.overview.as_deref()
    }

    pub fn rating(&self) -> Rating {
        Rating {
            value: self.vote_average.unwrap_or(0.0),
            scale: RatingScale::OutOfTen,
        }
    }

    pub fn poster_url(&self, width: u32) -> Option<String> {
        self.poster_path
            .as_ref()
            .map(|path| format!("{TMDB_IMAGE_BASE}/w{width}{path}"))
    }

    pub fn watch_providers(&self) -> &[WatchProvider] {
        &self.watch_providers
    }

    pub fn watch_link(&self) -> String {
        format!("https://www.themoviedb.org/movie/{}/watch", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Game {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    background_image: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
}

impl Game {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn background_image(&self) -> Option<&str> {
        self.background_image.as_deref()
    }

    pub fn rating(&self) -> Rating {
        Rating {
            value: self.rating.unwrap_or(0.0),
            scale: RatingScale::OutOfFive,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Movie(Movie),
    Game(Game),
}

impl Item {
    /// Decodes one catalog entry according to the kind that was requested.
    pub fn from_value(kind: RecommendationKind, value: serde_json::Value) -> serde_json::Result<Self> {
        match kind {
            RecommendationKind::Movies => serde_json::from_value(value).map(Item::Movie),
            RecommendationKind::Games => serde_json::from_value(value).map(Item::Game),
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Item::Movie(movie) => movie.id(),
            Item::Game(game) => game.id(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Item::Movie(movie) => movie.title(),
            Item::Game(game) => game.name(),
        }
    }

    pub fn rating(&self) -> Rating {
        match self {
            Item::Movie(movie) => movie.rating(),
            Item::Game(game) => game.rating(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationResult {
    detected_mood: MoodLabel,
    items: Vec<Item>,
}

impl RecommendationResult {
    pub fn new(detected_mood: MoodLabel, items: Vec<Item>) -> Self {
        Self { detected_mood, items }
    }

    pub fn detected_mood(&self) -> MoodLabel {
        self.detected_mood
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }
}
