use serde::{Deserialize, Serialize};

/// Stimulus categories sorted by the subject
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Bashkir,
    Russian,
    Cow,
    Horse,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Bashkir,
        Category::Russian,
        Category::Cow,
        Category::Horse,
    ];

    /// Display label shown above the response side.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Bashkir => "Башкиры",
            Category::Russian => "Русские",
            Category::Cow => "Коровы",
            Category::Horse => "Лошади",
        }
    }

    pub fn is_word(&self) -> bool {
        matches!(self, Category::Bashkir | Category::Russian)
    }
}

/// Response side of the screen
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Physical key the subject presses for this side.
    pub fn key_hint(&self) -> &'static str {
        match self {
            Side::Left => "E",
            Side::Right => "I",
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}
