//! parsekit -- Streaming parsers for content-delivery payloads
//!
//! Small, independent parsing components shared by content-delivery
//! clients: a JSON value model with a permissive decoder and a
//! minimal-escaping encoder, a TAR reader for bundle archives (buffer
//! and streaming modes), and an HTML5 tokenizer for downstream
//! renderers. Each component is a synchronous, single-pass
//! transformation with no shared state; none depends on another at
//! runtime.
//!
//! # Features
//!
//! - `std` (default) -- enables loading TAR archives from disk and the
//!   `std::error::Error` impls
//!
//! # Failure Behavior
//!
//! The components deliberately differ in how they fail. JSON decoding
//! never errors: malformed input yields the [`JsonValue::Invalid`]
//! sentinel. HTML5 tokenization never errors either, degrading bad
//! markup to literal text. JSON encoding and TAR extraction return
//! `Result`, since their failures (an unencodable value, a corrupt
//! header) must stop the caller.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![deny(clippy::large_enum_variant, clippy::large_stack_arrays, clippy::redundant_clone)]
#![warn(
    clippy::box_collection,
    clippy::needless_collect,
    clippy::map_clone,
    clippy::implicit_clone,
    clippy::inefficient_to_string
)]

extern crate alloc;

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod tar;
pub mod tokenizer;
pub mod value;

// Re-export key types for convenience
pub use decoder::{decode, JsonDecoder};
pub use encoder::{EncodeMode, JsonEncoder};
pub use error::{EncodeError, ParseKitError, TarError};
pub use tar::{TarEntry, TarFile};
pub use tokenizer::{tokenize_html, AttributeMap, Html5Tokenizer, Token};
pub use value::{JsonMap, JsonValue};
