//! Send client for the WhatsApp bridge.

pub mod audio;
pub mod client;

pub use audio::{AudioTranscoder, FfmpegTranscoder};
pub use client::{BridgeClient, ReplyTo};
