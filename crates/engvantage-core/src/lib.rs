//! engvantage-core — Session state, domain model, and stats persistence.
//!
//! This crate defines the data model, the session controller that owns what
//! is currently on screen, the persisted user-progress store, and the PCM
//! audio decode used for pronunciation playback. Network access lives behind
//! the `ContentGateway` trait, implemented in `engvantage-gateway`.

pub mod audio;
pub mod error;
pub mod model;
pub mod session;
pub mod stats;
pub mod traits;
