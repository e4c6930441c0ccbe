//! Curated rows shown before the user asks for anything.

use crate::consts::DISPLAY_LIMIT;
use crate::error::RequestError;
use crate::requester::RecommendationApi;
use crate::types::{Item, RecommendationKind, RecommendationRequest, Sentiment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverRow {
    pub title: &'static str,
    pub mood: Sentiment,
}

pub const DISCOVER_ROWS: [DiscoverRow; 3] = [
    DiscoverRow {
        title: "Thrilling Action",
        mood: Sentiment::Angry,
    },
    DiscoverRow {
        title: "Mind-Bending Mysteries",
        mood: Sentiment::Surprise,
    },
    DiscoverRow {
        title: "Happy Comedies",
        mood: Sentiment::Happy,
    },
];

/// Fetches the movies of one row: a request carrying only the row's mood as
/// the face signal, cut to the display limit.
pub async fn fetch_row<A>(api: &A, row: &DiscoverRow) -> Result<Vec<Item>, RequestError>
where
    A: RecommendationApi + ?Sized,
{
    let request = RecommendationRequest::for_mood(row.mood, RecommendationKind::Movies);
    let mut items = api.recommend(&request).await?.into_items();
    items.truncate(DISPLAY_LIMIT);
    tracing::debug!("discover row {:?}: {} items", row.title, items.len());
    Ok(items)
}
