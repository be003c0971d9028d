//! Pipeline stages for favorites-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. a different capture backend) without touching the
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! favorites ──▶ render ──▶ merge
//! (store JSON)  (CDP PDF)  (lopdf)
//! ```
//!
//! 1. [`favorites`] — locate the bookmark store, find the requested folder,
//!    flatten it into an ordered entry list
//! 2. [`render`]    — capture each entry's URL as a single-page PDF through
//!    one serially reused browser session; per-entry failures accumulate
//!    instead of aborting
//! 3. [`merge`]     — concatenate the captures into one document with an
//!    outline entry per source page

pub mod favorites;
pub mod merge;
pub mod render;
