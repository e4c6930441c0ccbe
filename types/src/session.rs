use crate::mood::MoodLabel;
use std::fmt;

/// The two live analysis signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    Face,
    Voice,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Face => f.write_str("face"),
            Modality::Voice => f.write_str("voice"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Signal {
    enabled: bool,
    mood: MoodLabel,
}

/// Raw mood inputs of one session.
///
/// A disabled signal always reads `MoodLabel::Unset`; enabling and disabling
/// move the flag and the label together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    text: String,
    face: Signal,
    voice: Signal,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn face_enabled(&self) -> bool {
        self.face.enabled
    }

    pub fn face_mood(&self) -> MoodLabel {
        self.face.mood
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice.enabled
    }

    pub fn voice_mood(&self) -> MoodLabel {
        self.voice.mood
    }

    pub fn is_enabled(&self, modality: Modality) -> bool {
        self.signal(modality).enabled
    }

    pub fn mood(&self, modality: Modality) -> MoodLabel {
        self.signal(modality).mood
    }

    /// The label to report for `modality`, or `None` when the signal is off.
    pub fn reported_mood(&self, modality: Modality) -> Option<MoodLabel> {
        let signal = self.signal(modality);
        signal.enabled.then_some(signal.mood)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Turns the signal on with a fresh `Connecting` label.
    pub fn enable(&mut self, modality: Modality) {
        *self.signal_mut(modality) = Signal {
            enabled: true,
            mood: MoodLabel::Connecting,
        };
    }

    pub fn disable(&mut self, modality: Modality) {
        *self.signal_mut(modality) = Signal::default();
    }

    /// Records a label for an enabled signal. Returns `false` and leaves the
    /// state untouched when the signal is disabled.
    pub fn set_mood(&mut self, modality: Modality, mood: MoodLabel) -> bool {
        let signal = self.signal_mut(modality);
        if !signal.enabled {
            return false;
        }
        signal.mood = mood;
        true
    }

    fn signal(&self, modality: Modality) -> &Signal {
        match modality {
            Modality::Face => &self.face,
            Modality::Voice => &self.voice,
        }
    }

    fn signal_mut(&mut self, modality: Modality) -> &mut Signal {
        match modality {
            Modality::Face => &mut self.face,
            Modality::Voice => &mut self.voice,
        }
    }
}
