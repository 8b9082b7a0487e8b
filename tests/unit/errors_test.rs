//! Unit tests for error types: messages, conversions and sources.

use std::error::Error;

use rstest::rstest;

use linkshelf::types::errors::{
    ApiError, BookmarkError, CacheError, ConfigError, SettingsError, SyncError, ValidationError,
};

#[rstest]
#[case(ApiError::Network("timed out".into()), "Network error: timed out")]
#[case(ApiError::Status { status: 401, body: String::new() }, "API request failed: 401")]
#[case(
    ApiError::Status { status: 400, body: "bad url".into() },
    "API request failed: 400. bad url"
)]
#[case(ApiError::Decode("eof".into()), "Invalid API response: eof")]
fn test_api_error_messages(#[case] err: ApiError, #[case] expected: &str) {
    assert_eq!(err.to_string(), expected);
}

#[rstest]
#[case(ValidationError::EmptyName, "Folder name cannot be empty")]
#[case(
    ValidationError::ContainsSeparator("a.b".into()),
    "Folder names cannot contain periods: a.b"
)]
#[case(ValidationError::DuplicateFolder("work".into()), "Folder \"work\" already exists")]
#[case(
    ValidationError::ReservedName("[Untagged]".into()),
    "Folder name \"[Untagged]\" is reserved"
)]
fn test_validation_messages(#[case] err: ValidationError, #[case] expected: &str) {
    assert_eq!(err.to_string(), expected);
}

#[test]
fn test_config_messages() {
    assert_eq!(ConfigError::MissingUrl.to_string(), "Linkding URL not set");
    assert_eq!(ConfigError::MissingToken.to_string(), "API token not set");
    assert!(ConfigError::ConnectionFailed("https://x".into())
        .to_string()
        .contains("https://x"));
}

#[test]
fn test_bookmark_error_conversions_keep_source() {
    let api: BookmarkError = ApiError::Network("down".into()).into();
    assert_eq!(api.to_string(), "Network error: down");
    assert!(api.source().is_some());

    let validation: BookmarkError = ValidationError::UntaggedFolder.into();
    assert!(matches!(validation, BookmarkError::Validation(_)));

    let cache: BookmarkError = CacheError::DatabaseError("locked".into()).into();
    assert_eq!(cache.to_string(), "Cache database error: locked");

    assert!(BookmarkError::NotFound(3).source().is_none());
}

#[test]
fn test_batch_failure_message() {
    let err = BookmarkError::BatchFailed {
        failed: 2,
        total: 5,
        first: "API request failed: 500".into(),
    };
    assert_eq!(
        err.to_string(),
        "2 of 5 bookmark updates failed: API request failed: 500"
    );
}

#[test]
fn test_sync_error_from_api() {
    let err: SyncError = ApiError::Decode("x".into()).into();
    assert_eq!(err, SyncError::Api(ApiError::Decode("x".into())));
    assert!(err.to_string().starts_with("Error during sync"));
}

#[test]
fn test_settings_errors_box_as_std_errors() {
    let boxed: Box<dyn Error> = Box::new(SettingsError::InvalidKey("a.b".into()));
    assert_eq!(boxed.to_string(), "Invalid settings key: a.b");
}
