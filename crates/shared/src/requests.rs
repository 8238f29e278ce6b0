//! Request parameter types.

use serde::{Deserialize, Serialize};

/// Query string of a save (`PUT`/`POST /api/characters/{key}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveQuery {
    /// Storage key of the record the caller is currently editing. An empty
    /// value is treated the same as an absent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
}

impl SaveQuery {
    pub fn new(current: Option<&str>) -> Self {
        Self {
            current: current.map(str::to_string),
        }
    }

    /// The current key, with empty strings normalized away.
    pub fn current_key(&self) -> Option<&str> {
        self.current.as_deref().filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_current_is_absent() {
        assert_eq!(SaveQuery::new(Some("")).current_key(), None);
        assert_eq!(SaveQuery::new(None).current_key(), None);
        assert_eq!(SaveQuery::new(Some("Aria")).current_key(), Some("Aria"));
    }
}
