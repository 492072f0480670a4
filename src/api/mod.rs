//! API module for talking to the LMS
//!
//! This module contains everything that touches the network:
//! - Resource models for the JSON payloads
//! - `Link` and `Retry-After` header handling
//! - The throttled pager that walks paginated collections
//! - The typed client that knows the endpoint layout

mod client;
mod link;
pub mod models;
mod pager;

pub use client::{build_http_client, user_agent_string, CanvasApi};
pub use link::{next_link, retry_after_secs};
pub use pager::{Extract, ThrottledPager};
