use ::serenity::all::ClientBuilder;
use clap::Parser;
use poise::serenity_prelude as serenity;
use songbird::SerenityInit;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use jukebox::commands::{
    self,
    music::{
        audio_sources::YtDlpResolver,
        utils::{idle_supervisor::IdleSupervisor, music_manager::MusicManager},
    },
};
use jukebox::config::{Cli, Config};
use jukebox::events::Handler;
use jukebox::{Data, Error, logging};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    logging::init(&config.log_file)?;
    info!(
        "Starting with prefix '{}'{}",
        config.prefix,
        if config.development {
            " in development mode"
        } else {
            ""
        }
    );

    let music = Arc::new(MusicManager::new(
        Arc::new(YtDlpResolver::default()),
        config.queue.clone(),
    ));
    IdleSupervisor::new(music.clone(), config.idle_sweep_interval).spawn();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let data = Data {
        music: music.clone(),
        http_client: reqwest::Client::new(),
        prefix: config.prefix.clone(),
        started_at: Instant::now(),
    };

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.prefix.clone()),
                mention_as_prefix: true,
                ..Default::default()
            },
            on_error: |error| Box::pin(commands::on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let mut client = ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .event_handler(Handler::new(music, config.prefix, config.development))
        .register_songbird()
        .await?;

    client.start().await.map_err(Into::into)
}
