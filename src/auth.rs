//! Credential and token models exchanged between the edge and the backend.

pub mod credential;
pub mod token;

pub use credential::*;
pub use token::{secret::*, *};
