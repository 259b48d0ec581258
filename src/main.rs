use std::sync::Arc;

use dotenvy::dotenv;
use envconfig::Envconfig;
use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage},
        Dispatcher, UpdateFilterExt,
    },
    error_handlers::LoggingErrorHandler,
    prelude::*,
    utils::command::BotCommands,
};

pub mod api;
pub mod app;
pub mod config;
pub mod handlers;
pub mod services;
pub mod session;
pub mod utils;

use api::http::HttpPharmaApi;
use app::App;
use config::Config;
use handlers::{Command, SharedApi};

type Error = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load environment variables from a .env file if present
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    log::info!("Starting the PharmaSure bot...");

    let config = Config::init_from_env()?;
    let backend = config.backend_base()?;
    log::info!("Using backend at {}", backend);

    let api: SharedApi = Arc::new(HttpPharmaApi::new(backend)?);
    let bot = Bot::new(config.telegram_bot_token);
    bot.set_my_commands(Command::bot_commands()).await?;

    let handler = dialogue::enter::<Update, InMemStorage<App>, App, _>()
        // Commands, on either screen
        .branch(
            Update::filter_message()
                .branch(dptree::entry().filter_command::<Command>().endpoint(handlers::answer)),
        )
        // Documents and photos are prescription uploads
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.document().is_some() || msg.photo().is_some())
                .endpoint(handlers::dashboard::upload_prescription),
        )
        // Keyboard buttons and anything else
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    // Each chat keeps its own App in memory; nothing survives a restart.
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![api, InMemStorage::<App>::new()])
        // Dashboard request failures end up here and are only logged.
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error from a PharmaSure action",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Shutting down gracefully");
    Ok(())
}
