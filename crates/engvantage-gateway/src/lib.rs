//! engvantage-gateway — Generative-AI gateway clients.
//!
//! Implements the `ContentGateway` trait for the direct Gemini API, for a
//! credential-holding relay backend, and as a scripted mock for tests.
//! Prompt construction, response-shape normalization, and JSON parsing are
//! shared across the clients.

pub mod config;
pub mod gemini;
mod http;
pub mod mock;
pub mod parse;
pub mod prompt;
pub mod relay;
pub mod wire;

pub use config::{create_gateway, load_config, load_config_from, AppConfig, GatewayConfig};
pub use gemini::GeminiGateway;
pub use mock::MockGateway;
pub use relay::RelayGateway;
pub use wire::{normalize_reply, ReplyShapeError};
