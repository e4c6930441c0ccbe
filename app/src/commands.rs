use anyhow::{anyhow, bail, Context, Result};
use moodcast::types::genre::{genre_by_id, genre_by_name};
use moodcast::types::{GenreId, RecommendationKind};
use std::str::FromStr;

pub const HELP: &str = "\
commands:
  face on|off        toggle the camera signal
  voice on|off       toggle the microphone signal
  text <words>       describe how you feel (empty clears it)
  movies | games     choose what to recommend
  exclude <genre>    toggle a movie genre filter (name or id)
  genres             list movie genres and active filters
  go                 get recommendations
  reviews <id>       show viewer reviews of a movie
  discover           show the curated rows
  status             show the session state
  devices            list audio input devices
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Face(bool),
    Voice(bool),
    Text(String),
    Kind(RecommendationKind),
    Exclude(GenreId),
    Genres,
    Go,
    Reviews(u64),
    Discover,
    Status,
    Devices,
    Help,
    Quit,
}

fn switch(arg: &str) -> Result<bool> {
    match arg {
        "on" => Ok(true),
        "off" => Ok(false),
        other => bail!("expected on or off, got {:?}", other),
    }
}

fn genre(arg: &str) -> Result<GenreId> {
    let found = match arg.parse::<GenreId>() {
        Ok(id) => genre_by_id(id),
        Err(_) => genre_by_name(arg),
    };
    found.map(|g| g.id).ok_or_else(|| anyhow!("unknown genre {:?}", arg))
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let command = match word.to_lowercase().as_str() {
            "face" => Command::Face(switch(rest)?),
            "voice" => Command::Voice(switch(rest)?),
            "text" => Command::Text(rest.to_string()),
            "movies" => Command::Kind(RecommendationKind::Movies),
            "games" => Command::Kind(RecommendationKind::Games),
            "exclude" => Command::Exclude(genre(rest)?),
            "genres" => Command::Genres,
            "go" => Command::Go,
            "reviews" => Command::Reviews(rest.parse().context("reviews takes a movie id")?),
            "discover" => Command::Discover,
            "status" => Command::Status,
            "devices" => Command::Devices,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "" => bail!("empty command"),
            other => bail!("unknown command {:?}, try `help`", other),
        };
        Ok(command)
    }
}
