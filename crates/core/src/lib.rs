//! Domain logic for the knowledge-base guide.
//!
//! This crate has no database or HTTP dependencies. It owns the position
//! ordering algorithm, the content block state machine, slug and anchor
//! derivation, and the small value types shared by the `db` and `api` crates.

pub mod block;
pub mod error;
pub mod markdown;
pub mod media;
pub mod nav;
pub mod ordering;
pub mod qa_status;
pub mod search;
pub mod slug;
pub mod types;
pub mod validation;
