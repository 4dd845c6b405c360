use std::fmt;

use uuid::Uuid;

/// Opaque identity of a browsing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kinds of navigation activity a surface reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationKind {
    /// A navigation committed and the surface started loading.
    Committed,
    /// The location changed without a document load (history API, hash).
    InPage,
    /// The current load completed.
    Finished,
    /// The load failed. The surface keeps whatever it had rendered.
    Failed(String),
}

impl NavigationKind {
    /// Whether events of this kind carry a location the registry should follow.
    pub fn settles_location(&self) -> bool {
        !matches!(self, NavigationKind::Failed(_))
    }
}

/// A navigation event emitted by one surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    pub surface: SurfaceId,
    pub kind: NavigationKind,
    pub url: String,
}

impl NavigationEvent {
    pub fn new(surface: SurfaceId, kind: NavigationKind, url: impl Into<String>) -> Self {
        Self {
            surface,
            kind,
            url: url.into(),
        }
    }
}
