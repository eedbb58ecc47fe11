use std::fmt;
use std::path::{Path, PathBuf};

/// Result type for gridpath operations
pub type Result<T> = std::result::Result<T, GridPathError>;

/// Main error type for the gridpath crate
#[derive(Debug, Clone, PartialEq)]
pub enum GridPathError {
    /// Invalid dimensions for operations
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value, raised at construction time
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Invalid action
    InvalidAction {
        action: usize,
        max_actions: usize,
    },

    /// A state outside the grid reached the training loop
    InvalidState {
        x: i64,
        y: i64,
        grid_size: usize,
    },

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),
}

impl fmt::Display for GridPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridPathError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            GridPathError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            GridPathError::InvalidAction { action, max_actions } => {
                write!(f, "Invalid action {}: must be less than {}", action, max_actions)
            }
            GridPathError::InvalidState { x, y, grid_size } => {
                write!(f, "State ({}, {}) lies outside a {}x{} grid", x, y, grid_size, grid_size)
            }
            GridPathError::IoError(msg) => write!(f, "IO error: {}", msg),
            GridPathError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for GridPathError {}

impl From<std::io::Error> for GridPathError {
    fn from(err: std::io::Error) -> Self {
        GridPathError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for GridPathError {
    fn from(err: bincode::Error) -> Self {
        GridPathError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for GridPathError {
    fn from(err: serde_json::Error) -> Self {
        GridPathError::SerializationError(err.to_string())
    }
}

impl GridPathError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        GridPathError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        GridPathError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable tag used in structured error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            GridPathError::DimensionMismatch { .. } => "dimension_mismatch",
            GridPathError::InvalidParameter { .. } => "invalid_parameter",
            GridPathError::InvalidAction { .. } => "invalid_action",
            GridPathError::InvalidState { .. } => "invalid_state",
            GridPathError::IoError(_) => "io",
            GridPathError::SerializationError(_) => "serialization",
        }
    }
}

/// Failure to restore persisted agent state.
///
/// Never fatal: the trainer answers every variant by starting from freshly
/// initialized parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// The artifact does not exist
    Missing(PathBuf),

    /// The artifact exists but could not be read
    Unreadable { path: PathBuf, reason: String },

    /// The artifact was read but does not describe a usable agent
    Malformed { path: PathBuf, reason: String },
}

impl LoadError {
    pub(crate) fn from_io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            LoadError::Missing(path.to_path_buf())
        } else {
            LoadError::Unreadable {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }
        }
    }

    pub(crate) fn malformed<S: Into<String>>(path: &Path, reason: S) -> Self {
        LoadError::Malformed {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Path of the artifact that failed to load
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Missing(path) => path,
            LoadError::Unreadable { path, .. } | LoadError::Malformed { path, .. } => path,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Missing(path) => write!(f, "{} does not exist", path.display()),
            LoadError::Unreadable { path, reason } => {
                write!(f, "could not read {}: {}", path.display(), reason)
            }
            LoadError::Malformed { path, reason } => {
                write!(f, "{} is malformed: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for LoadError {}
