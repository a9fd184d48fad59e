//! Wire types for the reasoning-tier `responses` API.

pub mod request;
pub mod response;

pub use request::{Reasoning, Request};
pub use response::{OutputPart, Response};
