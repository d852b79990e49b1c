//! Reply sources: the text to emit and the unit size to emit it in.

use std::str::{Chars, SplitWhitespace};
use std::time::Duration;

use crate::intro::ASSISTANT_INTRO;

/// Size of each emitted unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Whitespace-delimited words, each followed by one space.
    Word,
    /// Single characters.
    Char,
}

/// A complete reply waiting to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplySource {
    granularity: Granularity,
    text: String,
}

impl ReplySource {
    /// The fixed introduction, emitted word by word.
    pub fn intro() -> Self {
        Self {
            granularity: Granularity::Word,
            text: ASSISTANT_INTRO.to_string(),
        }
    }

    /// A model reply, emitted character by character.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            granularity: Granularity::Char,
            text: text.into(),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Pause between units when no configuration overrides it.
    pub fn default_delay(&self) -> Duration {
        Pacing::default().delay_for(self.granularity)
    }

    /// Lazy, forward-only sequence of units to render.
    pub fn units(&self) -> Units<'_> {
        match self.granularity {
            Granularity::Word => Units::Words(self.text.split_whitespace()),
            Granularity::Char => Units::Chars(self.text.chars()),
        }
    }
}

/// Iterator over the units of a [`ReplySource`].
pub enum Units<'a> {
    Words(SplitWhitespace<'a>),
    Chars(Chars<'a>),
}

impl Iterator for Units<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self {
            Units::Words(words) => words.next().map(|w| format!("{w} ")),
            Units::Chars(chars) => chars.next().map(String::from),
        }
    }
}

/// Pause between units, per granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub word: Duration,
    pub char: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            word: Duration::from_millis(20),
            char: Duration::from_millis(10),
        }
    }
}

impl Pacing {
    /// No pauses at all.
    pub fn instant() -> Self {
        Self {
            word: Duration::ZERO,
            char: Duration::ZERO,
        }
    }

    pub fn delay_for(&self, granularity: Granularity) -> Duration {
        match granularity {
            Granularity::Word => self.word,
            Granularity::Char => self.char,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intro_units_are_words_with_trailing_space() {
        let source = ReplySource::intro();
        assert_eq!(source.granularity(), Granularity::Word);
        let units: Vec<String> = source.units().take(3).collect();
        assert_eq!(units, ["I ", "am ", "a "]);
        assert_eq!(
            source.units().count(),
            ASSISTANT_INTRO.split_whitespace().count()
        );
    }

    #[test]
    fn model_units_are_single_chars() {
        let source = ReplySource::model("Hi é");
        assert_eq!(source.granularity(), Granularity::Char);
        let units: Vec<String> = source.units().collect();
        assert_eq!(units, ["H", "i", " ", "é"]);
    }

    #[test]
    fn units_concatenate_back_to_text() {
        let source = ReplySource::model("  spaced out\n");
        assert_eq!(source.units().collect::<String>(), "  spaced out\n");

        let intro: String = ReplySource::intro().units().collect();
        assert_eq!(intro.trim(), ASSISTANT_INTRO);
    }

    #[test]
    fn default_pacing() {
        let pacing = Pacing::default();
        assert_eq!(pacing.delay_for(Granularity::Word), Duration::from_millis(20));
        assert_eq!(pacing.delay_for(Granularity::Char), Duration::from_millis(10));
        assert_eq!(Pacing::instant().delay_for(Granularity::Word), Duration::ZERO);
        assert_eq!(ReplySource::intro().default_delay(), Duration::from_millis(20));
        assert_eq!(ReplySource::model("x").default_delay(), Duration::from_millis(10));
    }
}
