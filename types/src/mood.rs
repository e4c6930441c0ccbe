use std::fmt;
use std::str::FromStr;

/// Sentiment tags the analysis service can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Happy,
    Sad,
    Angry,
    Fear,
    Surprise,
    Disgust,
    Calm,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 8] = [
        Sentiment::Happy,
        Sentiment::Sad,
        Sentiment::Angry,
        Sentiment::Fear,
        Sentiment::Surprise,
        Sentiment::Disgust,
        Sentiment::Calm,
        Sentiment::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Happy => "happy",
            Sentiment::Sad => "sad",
            Sentiment::Angry => "angry",
            Sentiment::Fear => "fear",
            Sentiment::Surprise => "surprise",
            Sentiment::Disgust => "disgust",
            Sentiment::Calm => "calm",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Sentiment::ALL
            .into_iter()
            .find(|sentiment| sentiment.as_str() == needle)
            .ok_or_else(|| UnknownMood(s.to_string()))
    }
}

/// The value held for one mood signal.
///
/// Besides the detected sentiment, a label can carry one of three
/// connection sentinels: `Unset` while the signal is disabled, `Connecting`
/// until the first label arrives, and `Error` once the channel has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MoodLabel {
    #[default]
    Unset,
    Connecting,
    Error,
    Detected(Sentiment),
}

pub const UNSET_TEXT: &str = "...";
pub const CONNECTING_TEXT: &str = "Connecting...";
pub const ERROR_TEXT: &str = "Error!";

impl MoodLabel {
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, MoodLabel::Detected(_))
    }

    pub fn sentiment(&self) -> Option<Sentiment> {
        match self {
            MoodLabel::Detected(sentiment) => Some(*sentiment),
            _ => None,
        }
    }
}

impl From<Sentiment> for MoodLabel {
    fn from(sentiment: Sentiment) -> Self {
        MoodLabel::Detected(sentiment)
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoodLabel::Unset => f.write_str(UNSET_TEXT),
            MoodLabel::Connecting => f.write_str(CONNECTING_TEXT),
            MoodLabel::Error => f.write_str(ERROR_TEXT),
            MoodLabel::Detected(sentiment) => sentiment.fmt(f),
        }
    }
}

impl FromStr for MoodLabel {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            UNSET_TEXT => Ok(MoodLabel::Unset),
            CONNECTING_TEXT => Ok(MoodLabel::Connecting),
            ERROR_TEXT => Ok(MoodLabel::Error),
            other => other.parse().map(MoodLabel::Detected),
        }
    }
}

impl serde::Serialize for MoodLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for MoodLabel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMood(pub String);

impl fmt::Display for UnknownMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown mood label: {:?}", self.0)
    }
}

impl std::error::Error for UnknownMood {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("Happy".parse::<MoodLabel>(), Ok(MoodLabel::Detected(Sentiment::Happy)));
        assert_eq!(" angry\n".parse::<MoodLabel>(), Ok(MoodLabel::Detected(Sentiment::Angry)));
        assert_eq!("Connecting...".parse::<MoodLabel>(), Ok(MoodLabel::Connecting));
        assert!("ecstatic".parse::<MoodLabel>().is_err());
    }

    #[test]
    fn sentinels_render_as_status_text() {
        assert_eq!(MoodLabel::Unset.to_string(), "...");
        assert_eq!(MoodLabel::Error.to_string(), "Error!");
        assert_eq!(MoodLabel::from(Sentiment::Surprise).to_string(), "surprise");
        assert!(MoodLabel::Connecting.is_sentinel());
        assert!(!MoodLabel::Detected(Sentiment::Calm).is_sentinel());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&MoodLabel::Detected(Sentiment::Fear)).unwrap();
        assert_eq!(json, "\"fear\"");
        let back: MoodLabel = serde_json::from_str("\"sad\"").unwrap();
        assert_eq!(back, MoodLabel::Detected(Sentiment::Sad));
    }
}
