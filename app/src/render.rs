use moodcast::consts::{DISPLAY_LIMIT, REVIEW_EXCERPT_CHARS, REVIEW_PREVIEW_LIMIT};
use moodcast::types::{Filters, Item, Review, SessionState, GENRES};

pub fn session(state: &SessionState, status: &str) {
    println!("status: {status}");
    let text = if state.text().is_empty() { "-" } else { state.text() };
    println!("  text : {text}");
    println!(
        "  face : {} ({})",
        state.face_mood(),
        if state.face_enabled() { "on" } else { "off" }
    );
    println!(
        "  voice: {} ({})",
        state.voice_mood(),
        if state.voice_enabled() { "on" } else { "off" }
    );
}

/// Prints the first items of a result list, in the order received.
pub fn items(items: &[Item]) {
    if items.is_empty() {
        println!("  (nothing found)");
        return;
    }
    for (n, item) in items.iter().take(DISPLAY_LIMIT).enumerate() {
        println!("{:>3}. {} [{}] id={}", n + 1, item.title(), item.rating(), item.id());
        if let Item::Movie(movie) = item {
            let providers = movie
                .watch_providers()
                .iter()
                .map(|p| p.provider_name())
                .collect::<Vec<_>>();
            if !providers.is_empty() {
                println!("     watch on: {}", providers.join(", "));
            }
            println!("     {}", movie.watch_link());
        }
    }
}

pub fn reviews(movie_id: u64, reviews: &[Review]) {
    if reviews.is_empty() {
        println!("No viewer reviews found for movie {movie_id}.");
        return;
    }
    for review in reviews.iter().take(REVIEW_PREVIEW_LIMIT) {
        println!("-- {}", review.author());
        println!("{}", review.excerpt(REVIEW_EXCERPT_CHARS));
    }
}

pub fn genres(filters: &Filters) {
    for genre in GENRES.iter() {
        let mark = if filters.is_excluded(genre.id) { "x" } else { " " };
        println!("  [{mark}] {:>5} {}", genre.id, genre.name);
    }
}
