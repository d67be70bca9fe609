use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::PlayerId;

/// Display metadata kept outside the match log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl PlayerProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nickname: None,
            avatar: None,
            created_at: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerDirectory {
    profiles: HashMap<PlayerId, PlayerProfile>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, player_id: PlayerId, profile: PlayerProfile) {
        self.profiles.insert(player_id, profile);
    }

    pub fn get(&self, player_id: &PlayerId) -> Option<&PlayerProfile> {
        self.profiles.get(player_id)
    }

    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.profiles.contains_key(player_id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.profiles.keys()
    }

    /// Name used for ordering; unknown players fall back to their id.
    pub fn name_of(&self, player_id: &PlayerId) -> String {
        self.get(player_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| player_id.0.clone())
    }

    pub fn display_name_of(&self, player_id: &PlayerId) -> String {
        self.get(player_id)
            .map(|p| p.display_name().to_string())
            .unwrap_or_else(|| player_id.0.clone())
    }
}

impl FromIterator<(PlayerId, PlayerProfile)> for PlayerDirectory {
    fn from_iter<T: IntoIterator<Item = (PlayerId, PlayerProfile)>>(iter: T) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
        }
    }
}
