use std::collections::HashSet;

use crate::types::SeriesId;

/// Per-series show/hide toggles. Series are visible unless explicitly hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityModel {
    hidden: HashSet<SeriesId>,
}

impl VisibilityModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the visibility of `id` changed
    pub fn set(&mut self, id: &SeriesId, visible: bool) -> bool {
        if visible {
            self.hidden.remove(id.as_str())
        } else {
            self.hidden.insert(id.clone())
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        !self.hidden.contains(id)
    }

    pub fn hidden(&self) -> impl Iterator<Item = &SeriesId> {
        self.hidden.iter()
    }

    pub fn show_all(&mut self) {
        self.hidden.clear();
    }
}
