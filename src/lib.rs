//! s3-embed — signed S3 links and directory listings as HTML fragments
//!
//! Turns short references like `s3://bucket/key` into time-limited signed
//! links, and prefixes like `s3://bucket/dir` into listings of signed links
//! one level deep, optionally titled from a sidecar JSON mapping. Rendered
//! fragments are cached for a short TTL so repeated embeds of the same
//! reference do not re-list or re-sign.
//!
//! The storage side is a thin seam: the [`storage::ObjectStore`] trait
//! (list / read / presign) with a SigV4 [`storage::S3Client`] behind it.
//! All shared mutable state — settings, client handle, fragment cache —
//! lives in an explicit [`Session`] owned by the caller.

pub mod cache;
pub mod error;
pub mod handler;
pub mod listing;
pub mod reference;
pub mod render;
pub mod session;
pub mod settings;
pub mod storage;
pub mod titles;

pub use cache::{fingerprint, FragmentCache};
pub use error::RenderError;
pub use listing::{filter_listing, filter_listing_anchored};
pub use reference::{
    parse_bucket, parse_filename, parse_filename_from_key, parse_key, Reference,
};
pub use render::{EmbedAttrs, SignedEntry};
pub use session::Session;
pub use settings::Settings;
pub use storage::{ObjectEntry, ObjectStore, S3Client, S3ClientConfig, StorageError};
