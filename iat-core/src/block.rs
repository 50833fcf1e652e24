use serde::{Deserialize, Serialize};

use crate::{Category, Side};

/// One phase of the test: a fixed category-to-side mapping and trial count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: u32,
    pub title: String,
    pub instruction: String,
    pub left_categories: Vec<Category>,
    pub right_categories: Vec<Category>,
    pub trial_count: usize,
}

impl Block {
    /// Side the subject must press for `category`. Anything not on the left
    /// is answered on the right.
    pub fn correct_side(&self, category: Category) -> Side {
        if self.left_categories.contains(&category) {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Categories active in this block, left side first.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.left_categories
            .iter()
            .chain(self.right_categories.iter())
            .copied()
    }

    pub fn is_active(&self, category: Category) -> bool {
        self.categories().any(|c| c == category)
    }

    /// First category assigned to both sides, if any.
    pub fn overlapping_category(&self) -> Option<Category> {
        self.left_categories
            .iter()
            .copied()
            .find(|c| self.right_categories.contains(c))
    }

    pub fn labels(&self, side: Side) -> Vec<&'static str> {
        let categories = match side {
            Side::Left => &self.left_categories,
            Side::Right => &self.right_categories,
        };
        categories.iter().map(Category::label).collect()
    }
}
