use serde::{Deserialize, Serialize};

use crate::Category;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StimulusKind {
    Word,
    Image,
}

/// A presentable item from the fixed pool. `content` is the word itself or
/// an image reference, depending on `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stimulus {
    pub id: String,
    pub kind: StimulusKind,
    pub category: Category,
    pub content: String,
}

impl Stimulus {
    pub fn word(id: impl Into<String>, category: Category, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: StimulusKind::Word,
            category,
            content: text.into(),
        }
    }

    pub fn image(id: impl Into<String>, category: Category, src: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: StimulusKind::Image,
            category,
            content: src.into(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, StimulusKind::Word)
    }
}
