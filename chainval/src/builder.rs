//! Certificate chain building and retrieval of artifacts from URIs

pub mod chain_builder;

#[cfg(feature = "remote")]
pub mod uri_utils;

pub use crate::builder::chain_builder::*;

#[cfg(feature = "remote")]
pub use crate::builder::uri_utils::*;
