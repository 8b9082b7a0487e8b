use std::fmt;

// === ApiError ===

/// Errors returned by the remote linkding REST API or the transport beneath it.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset).
    Network(String),
    /// The server answered with a non-2xx status.
    Status { status: u16, body: String },
    /// The response body could not be decoded.
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Status { status, body } => {
                if body.is_empty() {
                    write!(f, "API request failed: {}", status)
                } else {
                    write!(f, "API request failed: {}. {}", status, body)
                }
            }
            ApiError::Decode(msg) => write!(f, "Invalid API response: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

// === ConfigError ===

/// Errors related to missing or unusable connection settings.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// No linkding base URL is configured.
    MissingUrl,
    /// No API token is configured.
    MissingToken,
    /// The connectivity probe against `/api/` did not succeed.
    ConnectionFailed(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingUrl => write!(f, "Linkding URL not set"),
            ConfigError::MissingToken => write!(f, "API token not set"),
            ConfigError::ConnectionFailed(url) => {
                write!(f, "Connection failed for {}. Check the URL and API token", url)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// === ValidationError ===

/// Local validation failures for folder (tag) names. These block the action.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The folder name is empty or whitespace only.
    EmptyName,
    /// The folder name contains the `.` hierarchy separator.
    ContainsSeparator(String),
    /// A folder with the resulting full tag name already exists.
    DuplicateFolder(String),
    /// The untagged bucket cannot be renamed or removed.
    UntaggedFolder,
    /// The name is reserved for the untagged bucket.
    ReservedName(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "Folder name cannot be empty"),
            ValidationError::ContainsSeparator(name) => {
                write!(f, "Folder names cannot contain periods: {}", name)
            }
            ValidationError::DuplicateFolder(tag) => {
                write!(f, "Folder \"{}\" already exists", tag)
            }
            ValidationError::UntaggedFolder => {
                write!(f, "The untagged folder cannot be renamed or removed")
            }
            ValidationError::ReservedName(name) => {
                write!(f, "Folder name \"{}\" is reserved", name)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

// === CacheError ===

/// Errors related to the local bookmark cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Database operation failed.
    DatabaseError(String),
    /// Cached payload could not be encoded or decoded.
    SerializationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::DatabaseError(msg) => write!(f, "Cache database error: {}", msg),
            CacheError::SerializationError(msg) => {
                write!(f, "Cache serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for CacheError {}

// === BookmarkError ===

/// Errors surfaced by the bookmark view-model to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkError {
    /// Bookmark with the given ID is not in the loaded list.
    NotFound(i64),
    /// The remote write or fetch failed.
    Api(ApiError),
    /// A folder name was rejected locally.
    Validation(ValidationError),
    /// Reading or writing the cache failed.
    Cache(CacheError),
    /// Part of a bulk rename/remove failed; local state was reloaded.
    BatchFailed { failed: usize, total: usize, first: String },
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            BookmarkError::Api(e) => write!(f, "{}", e),
            BookmarkError::Validation(e) => write!(f, "{}", e),
            BookmarkError::Cache(e) => write!(f, "{}", e),
            BookmarkError::BatchFailed { failed, total, first } => write!(
                f,
                "{} of {} bookmark updates failed: {}",
                failed, total, first
            ),
        }
    }
}

impl std::error::Error for BookmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BookmarkError::Api(e) => Some(e),
            BookmarkError::Validation(e) => Some(e),
            BookmarkError::Cache(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ApiError> for BookmarkError {
    fn from(e: ApiError) -> Self {
        BookmarkError::Api(e)
    }
}

impl From<ValidationError> for BookmarkError {
    fn from(e: ValidationError) -> Self {
        BookmarkError::Validation(e)
    }
}

impl From<CacheError> for BookmarkError {
    fn from(e: CacheError) -> Self {
        BookmarkError::Cache(e)
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => write!(f, "Invalid settings value: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

// === SyncError ===

/// Errors raised while replaying the tag tree into a native bookmark tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Fetching bookmarks from the remote service failed.
    Api(ApiError),
    /// The native bookmark tree rejected an operation.
    Host(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Api(e) => write!(f, "Error during sync: {}", e),
            SyncError::Host(msg) => write!(f, "Bookmark tree error: {}", msg),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<ApiError> for SyncError {
    fn from(e: ApiError) -> Self {
        SyncError::Api(e)
    }
}
