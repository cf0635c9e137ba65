//! Path codec subsystem.
//!
//! # Data Flow
//! ```text
//! child path ("/detail?a=1#top")
//!     → path.rs decode to canonical form (undo any prior escaping)
//!     → escape '&' and '=' to private markers (%M1, %M2)
//!     → percent-encode as a URI component
//!     → token safe to embed as one query value
//! ```
//!
//! # Design Decisions
//! - Encoding is idempotent: already-encoded input is normalized first
//! - Decoding never fails; malformed input is returned as-is
//! - Private markers survive decoding until the final un-escape step

pub mod path;

pub use path::{decode, encode, CodecError};
