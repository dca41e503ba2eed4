//! Currex Common Types
//!
//! This crate contains shared types used across the Currex workspace,
//! including currency identifiers, monetary types, and the domain error
//! taxonomy.

pub mod identifiers;
pub mod monetary;
pub mod error;

pub use identifiers::*;
pub use monetary::*;
pub use error::*;
