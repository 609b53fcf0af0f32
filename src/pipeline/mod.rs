//! Pipeline stages from a user-selected file to a validated [`Quiz`].
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ generate ──▶ cleanup + parse
//! (path/URL)  (base64 +   (one model     (fence strip,
//!              MIME)       call)          JSON checks)
//! ```
//!
//! 1. [`input`]    load the file from disk or an HTTP(S) URL, size-capped
//! 2. [`encode`]   sniff the MIME type and base64-wrap the bytes
//! 3. [`generate`] build the structured-output request and validate the reply;
//!    the only stage with network I/O
//! 4. [`cleanup`]  deterministic text fixes applied before JSON parsing
//!
//! [`Quiz`]: crate::quiz::Quiz

pub mod cleanup;
pub mod encode;
pub mod generate;
pub mod input;
