pub mod genre;
pub mod mood;
pub mod recommendation;
pub mod review;
pub mod session;

pub use genre::{Genre, GenreId, GENRES};
pub use mood::{MoodLabel, Sentiment};
pub use recommendation::{
    Filters, Game, Item, Movie, Rating, RatingScale, RecommendationKind, RecommendationRequest,
    RecommendationResponse, RecommendationResult, WatchProvider,
};
pub use review::Review;
pub use session::{Modality, SessionState};
