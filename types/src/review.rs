#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Review {
    id: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    content: String,
}

impl Review {
    pub fn new(id: &str, author: &str, content: &str) -> Self {
        Self {
            id: id.to_string(),
            author: author.to_string(),
            content: content.to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// The first `max_chars` characters of the content, with an ellipsis when cut.
    pub fn excerpt(&self, max_chars: usize) -> String {
        match self.content.char_indices().nth(max_chars) {
            Some((end, _)) => format!("{}...", &self.content[..end]),
            None => self.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_respects_char_boundaries() {
        let review = Review::new("r1", "ana", "héllo wörld");
        assert_eq!(review.excerpt(5), "héllo...");
        assert_eq!(review.excerpt(50), "héllo wörld");
    }
}
