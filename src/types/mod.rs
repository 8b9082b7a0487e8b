// Linkshelf shared type definitions
// Each submodule defines types used across the library and both binaries.

pub mod bookmark;
pub mod errors;
pub mod interaction;
pub mod settings;
pub mod tag;
