//! video-encoder-factory - runtime-composed video encoder factory
//!
//! This crate assembles a software encoder backend and an optional native
//! backend into one factory, negotiates a single ordered format list, routes
//! encoder creation to the owning backend and instruments created encoders
//! with profiling markers.

pub mod config;
pub mod error;
pub mod profiling;
pub mod video;

pub use error::{FactoryError, Result};
