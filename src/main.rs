mod commands;
mod config;
mod matches;
mod pickle;

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

// User data, which is stored and accessible in all command invocations
pub struct Data {
    settings: config::Settings,
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    // Only command errors get custom handling, the rest go to the default handler
    match error {
        poise::FrameworkError::Setup { error, .. } => panic!("Failed to start bot: {:?}", error),
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(
                "Error in command `{}`: {:?}",
                ctx.command().qualified_name,
                error
            );
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e)
            }
        }
    }
}

async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    _data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Ready { data_about_bot, .. } = event {
        info!("Logged in as {:?}", data_about_bot.user.name);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    for (variable, default) in &config.defaulted {
        warn!(
            "Missing environment variable {:?}, using default {:?}",
            variable, default
        );
    }

    let settings = config::Settings::load_or_default(&config.settings_path)?;
    info!("Loaded settings {:?}", settings);

    let options = poise::FrameworkOptions {
        commands: vec![commands::pickle()],
        on_error: |error| Box::pin(on_error(error)),
        pre_command: |ctx| {
            Box::pin(async move {
                info!("Executing command {}...", ctx.command().qualified_name);
            })
        },
        post_command: |ctx| {
            Box::pin(async move {
                info!(
                    "Ran {:?} for {} (ID {})",
                    ctx.command().qualified_name,
                    ctx.author().name,
                    ctx.author().id
                );
            })
        },
        event_handler: |ctx, event, framework, data| {
            Box::pin(event_handler(ctx, event, framework, data))
        },
        ..Default::default()
    };

    let framework = poise::Framework::builder()
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Synced commands");
                Ok(Data { settings })
            })
        })
        .options(options)
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    let mut client = serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
            shard_manager.shutdown_all().await;
        }
    });

    client.start().await?;
    Ok(())
}
