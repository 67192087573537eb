use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable key of one entry in a link list.
///
/// Ids are random v4 UUIDs minted when the entry is created and are never
/// regenerated, so clearing or appending entries never disturbs identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Map-pin collection links shared from a bookmark list.
    Bookmark,
    /// Store information links.
    Store,
}

impl LinkKind {
    pub const ALL: [LinkKind; 2] = [LinkKind::Bookmark, LinkKind::Store];

    /// Path of the validation route relative to the API base URL.
    pub fn validation_path(self) -> &'static str {
        match self {
            LinkKind::Bookmark => "pings/bookmark",
            LinkKind::Store => "pings/store",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LinkKind::Bookmark => "맵핀 모음 링크",
            LinkKind::Store => "가게 정보 링크",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::Bookmark => "bookmark",
            LinkKind::Store => "store",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
