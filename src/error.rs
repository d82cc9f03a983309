//! Render-pipeline error taxonomy
//!
//! Storage failures are tagged with the pipeline stage they aborted so the
//! caller (and the inline error fragment) can say what actually went wrong.
//! Parsing has no error arm at all — degenerate references parse to empty
//! fields — and a cache miss is normal control flow, not an error.

use thiserror::Error;

use crate::storage::StorageError;

/// A failure inside one render.
///
/// `Signing` and `Listing` abort the current render and are shown as an
/// inline error fragment; `TitleFetch` is always recovered locally by falling
/// back to filename titles. None of these crash the host or poison the
/// result cache: a failed render is never cached.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot sign link: {0}")]
    Signing(StorageError),

    #[error("cannot list: {0}")]
    Listing(StorageError),

    #[error("cannot fetch titles: {0}")]
    TitleFetch(StorageError),
}
