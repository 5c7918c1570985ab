//! Service Layer
//!
//! Cache-aside reads and background refreshes. Route handlers call these
//! services and only decide how an empty result is rendered.

mod dataset_service;
mod ideology_service;

pub use dataset_service::*;
pub use ideology_service::*;
