//! This module aggregates all the command modules for the bot.

/// General purpose commands (e.g., ping, info, clear).
pub mod general;
/// Commands related to music playback.
pub mod music;

use tracing::{error, warn};

use crate::{CommandResult, Context, Data, Error};
use music::utils::{embedded_messages, music_manager::MusicError};

/// Show help for all commands or a specific one
#[poise::command(prefix_command, slash_command, category = "General")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
pub async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}

/// Every command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    use general::{clear::*, info::*, ping::*};
    use music::{
        clear_queue::*, enqueue::*, join::*, leave::*, multi_queue::*, play_queue::*, show_queue::*,
        skip::*, stop::*, volume::*,
    };

    vec![
        // Default commands
        register(),
        help(),
        // General commands
        ping(),
        info(),
        clear(),
        // Music commands
        join(),
        enqueue(),
        multi_queue(),
        show_queue(),
        play_queue(),
        replay_queue(),
        skip_queue_entry(),
        clear_queue(),
        stop_queue(),
        volume(),
        leave(),
    ]
}

/// Turns every command failure into a reply; nothing escapes to the client.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let message = match error.downcast_ref::<MusicError>() {
                Some(music_error) => {
                    warn!("Command '{}' failed: {}", ctx.command().name, music_error);
                    music_error.user_message()
                }
                None => {
                    error!("Command '{}' failed: {}", ctx.command().name, error);
                    "Something went wrong.".to_string()
                }
            };
            if let Err(e) = ctx.send(embedded_messages::error(message)).await {
                error!("Failed to report command error: {}", e);
            }
        }
        poise::FrameworkError::CooldownHit {
            remaining_cooldown,
            ctx,
            ..
        } => {
            let error = MusicError::RateLimited(remaining_cooldown);
            if let Err(e) = ctx.say(error.user_message()).await {
                error!("Failed to report cooldown: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
