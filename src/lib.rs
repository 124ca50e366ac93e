//! A Discord music bot: text and slash commands drive a per-guild playback
//! queue, and idle voice sessions are disconnected automatically.

use std::sync::Arc;
use std::time::Instant;

pub mod commands;
pub mod config;
pub mod events;
pub mod logging;

use commands::music::utils::music_manager::MusicManager;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub music: Arc<MusicManager>,
    /// Shared client used to open track streams.
    pub http_client: reqwest::Client,
    pub prefix: String,
    pub started_at: Instant,
}
