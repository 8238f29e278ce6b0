//! The state of one editing session.

use charsheet_domain::{Character, StorageKey};
use charsheet_shared::CharacterSummary;
use chrono::{DateTime, Utc};

/// Everything the editor shows besides the sheet itself.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSession {
    /// The character being edited. Derived fields are always current.
    pub character: Character,
    /// Storage key of the persisted record, unset until the first save.
    pub current_key: Option<StorageKey>,
    /// Set when the last save hit a name conflict.
    pub name_error: Option<String>,
    /// Time of the last successful save or rename.
    pub last_saved: Option<DateTime<Utc>>,
    /// Last fetched character listing.
    pub characters: Vec<CharacterSummary>,
    pub is_loading: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self {
            character: Character::new(),
            current_key: None,
            name_error: None,
            last_saved: None,
            characters: Vec::new(),
            is_loading: false,
        }
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record is persisted, or the name is worth persisting.
    pub fn wants_autosave(&self) -> bool {
        self.current_key.is_some() || self.character.has_display_name()
    }

    /// Whether `key` appears in the cached listing.
    pub fn is_listed(&self, key: &StorageKey) -> bool {
        self.characters
            .iter()
            .any(|summary| summary.storage_key == key.as_str())
    }

    /// Start over with a fresh character. The listing is kept.
    pub fn reset(&mut self) {
        self.character = Character::new();
        self.current_key = None;
        self.name_error = None;
        self.last_saved = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_unsaved_character_does_not_autosave() {
        let mut session = EditorSession::new();
        session.character.name = "   ".to_string();
        assert!(!session.wants_autosave());

        session.current_key = Some(StorageKey::from_name("Aria"));
        assert!(session.wants_autosave());
    }

    #[test]
    fn named_character_autosaves() {
        let session = EditorSession::new();
        assert!(session.wants_autosave());
    }

    #[test]
    fn reset_keeps_listing() {
        let mut session = EditorSession::new();
        session.current_key = Some(StorageKey::from_name("Aria"));
        session.name_error = Some("taken".to_string());
        session.last_saved = Some(Utc::now());
        session.characters.push(CharacterSummary {
            name: "Aria".to_string(),
            class: String::new(),
            level: 1,
            storage_key: "Aria".to_string(),
        });

        session.reset();

        assert_eq!(session.current_key, None);
        assert_eq!(session.name_error, None);
        assert_eq!(session.last_saved, None);
        assert!(session.is_listed(&StorageKey::from_name("Aria")));
    }
}
