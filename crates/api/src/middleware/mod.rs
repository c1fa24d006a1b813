//! Request middleware.

mod context;

pub use context::{ACTOR_HEADER, request_context};
