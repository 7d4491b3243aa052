//! Identity types for events and sessions.
//!
//! Unlike most identity types elsewhere in this lineage, `EventId` and
//! `SessionId` are not UUID newtypes: the envelope spec allows any
//! case-sensitive, length-bounded string a client supplies, and the store
//! itself generates plain UUIDv7 strings when a caller omits one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length, in bytes, of an `event_id` or `session_id`.
pub const MAX_ID_LENGTH: usize = 128;

/// Globally unique identifier for an event.
///
/// Case-sensitive. Generated as a UUIDv7 string when a caller does not
/// supply one, but any string up to [`MAX_ID_LENGTH`] bytes is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Generates a fresh, globally unique event id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EventId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for EventId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Identifier for a session: a stream of events belonging to one user journey.
///
/// Shape: case-sensitive, alphanumeric plus `_`/`-`, up to [`MAX_ID_LENGTH`] bytes.
/// Shape is enforced by [`crate::validate::validate_session_id`], not by this
/// type's constructors, so a `SessionId` can be built directly from trusted
/// sources (e.g. a row already accepted into the store) without re-checking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for SessionId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// A waypoint marker in the learning trail.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaypointId(String);

impl WaypointId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WaypointId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for WaypointId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Identifier for an artifact, scoped to a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ArtifactId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for ArtifactId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Label naming a branch within a session. Default `"main"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeadId(String);

impl HeadId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn main() -> Self {
        Self("main".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HeadId {
    fn default() -> Self {
        Self::main()
    }
}

impl fmt::Display for HeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for HeadId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for HeadId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Who performed an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorKind {
    User,
    System,
}

/// The actor attached to an event's envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub kind: ActorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Actor {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::User,
            id: Some(id.into()),
        }
    }

    pub fn system() -> Self {
        Self {
            kind: ActorKind::System,
            id: None,
        }
    }
}
