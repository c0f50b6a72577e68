//! Phrase library
//!
//! The overlay asks a [`PhraseLibrary`] for a batch of lines for the current
//! activity category. Two implementations ship: [`FallbackPhrases`], which
//! always says the same thing, and [`PhraseBook`], a JSON-described library
//! with per-category lists, per-style overrides and per-tone decorations.

use std::collections::HashMap;
use std::path::Path;

use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::activity::Category;
use crate::error::{CoreError, Result};
use crate::settings::{TextStyle, Tone};

/// Line used when nothing better is available
pub const FALLBACK_PHRASE: &str = "I am a floating text desktop pet";

const BUILTIN_BOOK: &str = include_str!("../assets/phrases.json");

pub trait PhraseLibrary: Send {
    fn set_style(&mut self, style: TextStyle) -> Result<()>;

    fn set_tone(&mut self, tone: Tone) -> Result<()>;

    /// `count` lines for `category`. No ordering guarantee, duplicates allowed.
    fn random_texts(&mut self, count: usize, category: Category) -> Vec<String>;
}

/// Library that only knows one line
#[derive(Debug, Clone)]
pub struct FallbackPhrases {
    style: TextStyle,
    tone: Tone,
}

impl Default for FallbackPhrases {
    fn default() -> Self {
        Self {
            style: TextStyle::Funny,
            tone: Tone::Normal,
        }
    }
}

impl FallbackPhrases {
    pub fn style(&self) -> TextStyle {
        self.style
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }
}

impl PhraseLibrary for FallbackPhrases {
    fn set_style(&mut self, style: TextStyle) -> Result<()> {
        self.style = style;
        Ok(())
    }

    fn set_tone(&mut self, tone: Tone) -> Result<()> {
        self.tone = tone;
        Ok(())
    }

    fn random_texts(&mut self, count: usize, _category: Category) -> Vec<String> {
        vec![FALLBACK_PHRASE.to_string(); count]
    }
}

/// Text wrapped around every line for a tone
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToneDecoration {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
}

impl ToneDecoration {
    fn apply(&self, line: &str) -> String {
        format!("{}{}{}", self.prefix, line, self.suffix)
    }
}

fn default_fallback() -> String {
    FALLBACK_PHRASE.to_string()
}

/// On-disk layout of a phrase book
#[derive(Debug, Deserialize)]
struct PhraseBookFile {
    #[serde(default = "default_fallback")]
    fallback: String,
    #[serde(default)]
    categories: HashMap<String, Vec<String>>,
    #[serde(default)]
    styles: HashMap<String, HashMap<String, Vec<String>>>,
    #[serde(default)]
    tones: HashMap<String, ToneDecoration>,
}

/// JSON-backed phrase library
#[derive(Debug, Clone)]
pub struct PhraseBook {
    fallback: String,
    shared: HashMap<Category, Vec<String>>,
    styled: HashMap<(TextStyle, Category), Vec<String>>,
    tones: HashMap<Tone, ToneDecoration>,
    style: TextStyle,
    tone: Tone,
}

fn parse_category(key: &str) -> Result<Category> {
    key.parse::<Category>()
        .map_err(|e| CoreError::Phrases(e.to_string()))
}

impl PhraseBook {
    /// Book embedded in the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_BOOK)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let book = Self::from_json(&content)?;
        tracing::info!("Loaded phrase book from {:?}", path);
        Ok(book)
    }

    /// Parse a phrase book. Unknown category, style or tone keys are an error.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: PhraseBookFile = serde_json::from_str(json)?;

        let mut shared = HashMap::new();
        for (key, lines) in file.categories {
            shared.insert(parse_category(&key)?, lines);
        }

        let mut styled = HashMap::new();
        for (style_key, categories) in file.styles {
            let style = style_key
                .parse::<TextStyle>()
                .map_err(|e| CoreError::Phrases(e.to_string()))?;
            for (key, lines) in categories {
                styled.insert((style, parse_category(&key)?), lines);
            }
        }

        let mut tones = HashMap::new();
        for (key, decoration) in file.tones {
            let tone = key
                .parse::<Tone>()
                .map_err(|e| CoreError::Phrases(e.to_string()))?;
            tones.insert(tone, decoration);
        }

        Ok(Self {
            fallback: file.fallback,
            shared,
            styled,
            tones,
            style: TextStyle::Funny,
            tone: Tone::Normal,
        })
    }

    pub fn style(&self) -> TextStyle {
        self.style
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    /// Candidate lines: style-specific, then shared, then the general category
    fn pool(&self, category: Category) -> Option<&[String]> {
        let lookup = |category: Category| {
            self.styled
                .get(&(self.style, category))
                .filter(|lines| !lines.is_empty())
                .or_else(|| self.shared.get(&category).filter(|lines| !lines.is_empty()))
        };

        lookup(category)
            .or_else(|| lookup(Category::General))
            .map(Vec::as_slice)
    }
}

impl PhraseLibrary for PhraseBook {
    fn set_style(&mut self, style: TextStyle) -> Result<()> {
        self.style = style;
        Ok(())
    }

    fn set_tone(&mut self, tone: Tone) -> Result<()> {
        self.tone = tone;
        Ok(())
    }

    fn random_texts(&mut self, count: usize, category: Category) -> Vec<String> {
        let mut rng = rand::thread_rng();
        let decoration = self.tones.get(&self.tone).cloned().unwrap_or_default();

        let Some(pool) = self.pool(category) else {
            return vec![decoration.apply(&self.fallback); count];
        };

        (0..count)
            .map(|_| {
                let line = pool.choose(&mut rng).unwrap_or(&self.fallback);
                decoration.apply(line)
            })
            .collect()
    }
}
