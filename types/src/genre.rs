/// TMDb movie genre identifier.
pub type GenreId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genre {
    pub id: GenreId,
    pub name: &'static str,
}

pub const GENRES: [Genre; 18] = [
    Genre { id: 28, name: "Action" },
    Genre { id: 12, name: "Adventure" },
    Genre { id: 16, name: "Animation" },
    Genre { id: 35, name: "Comedy" },
    Genre { id: 80, name: "Crime" },
    Genre { id: 99, name: "Documentary" },
    Genre { id: 18, name: "Drama" },
    Genre { id: 10751, name: "Family" },
    Genre { id: 14, name: "Fantasy" },
    Genre { id: 36, name: "History" },
    Genre { id: 27, name: "Horror" },
    Genre { id: 10402, name: "Music" },
    Genre { id: 9648, name: "Mystery" },
    Genre { id: 10749, name: "Romance" },
    Genre { id: 878, name: "Sci-Fi" },
    Genre { id: 53, name: "Thriller" },
    Genre { id: 10752, name: "War" },
    Genre { id: 37, name: "Western" },
];

pub fn genre_by_id(id: GenreId) -> Option<&'static Genre> {
    GENRES.iter().find(|genre| genre.id == id)
}

/// Case-insensitive lookup by display name.
pub fn genre_by_name(name: &str) -> Option<&'static Genre> {
    let name = name.trim();
    GENRES.iter().find(|genre| genre.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_by_id_and_name() {
        assert_eq!(genre_by_id(9648).map(|g| g.name), Some("Mystery"));
        assert_eq!(genre_by_name("sci-fi").map(|g| g.id), Some(878));
        assert!(genre_by_id(1).is_none());
    }
}
