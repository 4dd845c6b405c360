use std::fmt;

// === SurfaceError ===

/// Errors raised by a browsing surface backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceError {
    /// The backend could not construct a new surface.
    Creation(String),
    /// An operation on a live surface (load, bounds, visibility) failed.
    Operation(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::Creation(msg) => write!(f, "Surface creation failed: {}", msg),
            SurfaceError::Operation(msg) => write!(f, "Surface operation failed: {}", msg),
        }
    }
}

impl std::error::Error for SurfaceError {}

// === PresentationError ===

/// Errors returned by the presentation controller's `show` transition.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationError {
    /// The requested URL was empty or whitespace.
    EmptyUrl,
    /// The target surface could not be created.
    Surface(SurfaceError),
}

impl fmt::Display for PresentationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentationError::EmptyUrl => write!(f, "Cannot show an empty URL"),
            PresentationError::Surface(err) => write!(f, "Cannot show surface: {}", err),
        }
    }
}

impl std::error::Error for PresentationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PresentationError::Surface(err) => Some(err),
            PresentationError::EmptyUrl => None,
        }
    }
}

impl From<SurfaceError> for PresentationError {
    fn from(err: SurfaceError) -> Self {
        PresentationError::Surface(err)
    }
}

// === SessionError ===

/// Errors related to the shared cookie session.
#[derive(Debug)]
pub enum SessionError {
    /// The partition directory could not be created or accessed.
    IoError(String),
    /// Cookie jar database operation failed.
    DatabaseError(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::IoError(msg) => write!(f, "Session I/O error: {}", msg),
            SessionError::DatabaseError(msg) => {
                write!(f, "Session database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SessionError {}

impl From<rusqlite::Error> for SessionError {
    fn from(err: rusqlite::Error) -> Self {
        SessionError::DatabaseError(err.to_string())
    }
}

// === SettingsError ===

/// Errors related to loading and saving shell settings.
#[derive(Debug)]
pub enum SettingsError {
    /// File system read/write failed.
    IoError(String),
    /// The settings file could not be parsed or written as JSON.
    SerializationError(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === BoundaryError ===

/// Errors produced while decoding a boundary channel message.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryError {
    /// The message body was not valid JSON or lacked required fields.
    Malformed(String),
    /// The message named a type the channel does not carry.
    UnknownMessage(String),
}

impl fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryError::Malformed(msg) => write!(f, "Malformed boundary message: {}", msg),
            BoundaryError::UnknownMessage(kind) => {
                write!(f, "Unknown boundary message: {}", kind)
            }
        }
    }
}

impl std::error::Error for BoundaryError {}
