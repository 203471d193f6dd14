//! Class-id to canonical-label mapping.

use std::collections::HashMap;

use crate::detection::{FIRE_LABEL, SMOKE_LABEL};

/// Authoritative mapping from model class ids to canonical labels.
///
/// When a class id has an entry here it overrides whatever name the model
/// reports for that class. Ids without an entry fall back to the model's
/// own name.
#[derive(Debug, Clone)]
pub struct ClassLabelMap {
    labels: HashMap<u32, String>,
}

impl ClassLabelMap {
    /// The standard hazard mapping: class 0 is smoke, class 1 is fire.
    pub fn hazard_default() -> Self {
        Self::from_pairs([(0, SMOKE_LABEL), (1, FIRE_LABEL)])
    }

    /// An empty map, so every label falls through to the model's name.
    pub fn empty() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            labels: pairs
                .into_iter()
                .map(|(id, label)| (id, label.into()))
                .collect(),
        }
    }

    /// The canonical label for a class id, when one is configured.
    pub fn canonical(&self, class_id: u32) -> Option<&str> {
        self.labels.get(&class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for ClassLabelMap {
    fn default() -> Self {
        Self::hazard_default()
    }
}
