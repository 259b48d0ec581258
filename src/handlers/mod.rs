use std::sync::Arc;

use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{ParseMode, ReplyMarkup},
    utils::command::BotCommands,
};

use crate::api::PharmaApi;
use crate::app::App;
use crate::services::login::AuthMode;
use crate::session::Role;

pub mod auth;
pub mod dashboard;
pub mod views;

use auth::FormEdit;
use dashboard::DashboardAction;
use views::Rendered;

pub type PharmaDialogue = Dialogue<App, InMemStorage<App>>;
pub type SharedApi = Arc<dyn PharmaApi>;
pub type HandlerResult = Result<(), crate::Error>;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Show the current screen.")]
    Start,
    #[command(description = "Display help information about available commands.")]
    Help,
    #[command(description = "Switch the form to sign up.")]
    Signup,
    #[command(description = "Switch the form to log in.")]
    Login,
    #[command(description = "Set the email, e.g. /email you@example.com")]
    Email(String),
    #[command(description = "Set the password, e.g. /password secret")]
    Password(String),
    #[command(description = "Pick the role: user or pharmacist.")]
    Role(String),
    #[command(description = "Create the account or log in.")]
    Submit,
    #[command(description = "Scan a medicine barcode, optionally giving a new one.")]
    Scan(String),
    #[command(description = "Refresh your medicine list.")]
    Medicines,
    #[command(description = "Add a sample medicine and refresh the list.")]
    AddSample,
    #[command(description = "Create a demo order.")]
    Order,
    #[command(description = "Check your notifications.")]
    Notifications,
    #[command(description = "Log out.")]
    Logout,
}

pub(crate) async fn send_screen(bot: &Bot, chat_id: ChatId, screen: Rendered) -> HandlerResult {
    bot.send_message(chat_id, screen.text)
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(ReplyMarkup::Keyboard(screen.keyboard))
        .await?;
    Ok(())
}

async fn send_usage(bot: &Bot, chat_id: ChatId, usage: &str) -> HandlerResult {
    bot.send_message(chat_id, usage).await?;
    Ok(())
}

/// Handles bot commands by routing them to the login form or the dashboard.
pub async fn answer(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: PharmaDialogue,
    app: App,
    api: SharedApi,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    match cmd {
        Command::Start => {
            log::info!("Received start command");
            send_screen(&bot, chat_id, views::render(&app)).await?;
        }
        Command::Help => {
            bot.send_message(chat_id, Command::descriptions().to_string())
                .await?;
        }
        Command::Signup => {
            auth::edit_form(bot, msg, dialogue, app, FormEdit::Mode(AuthMode::Signup)).await?
        }
        Command::Login => {
            auth::edit_form(bot, msg, dialogue, app, FormEdit::Mode(AuthMode::Login)).await?
        }
        Command::Email(email) => {
            let email = email.trim();
            if email.is_empty() {
                send_usage(&bot, chat_id, "Usage: /email you@example.com").await?;
            } else {
                let edit = FormEdit::Email(email.to_string());
                auth::edit_form(bot, msg, dialogue, app, edit).await?
            }
        }
        Command::Password(password) => {
            if password.is_empty() {
                send_usage(&bot, chat_id, "Usage: /password <your password>").await?;
            } else {
                auth::edit_form(bot, msg, dialogue, app, FormEdit::Password(password)).await?
            }
        }
        Command::Role(role) => match role.parse::<Role>() {
            Ok(role) => auth::edit_form(bot, msg, dialogue, app, FormEdit::Role(role)).await?,
            Err(e) => send_usage(&bot, chat_id, e).await?,
        },
        Command::Submit => auth::submit(bot, msg, dialogue, app, api).await?,
        Command::Scan(code) => {
            dashboard::run(bot, msg, dialogue, app, api, DashboardAction::Scan(code)).await?
        }
        Command::Medicines => {
            dashboard::run(bot, msg, dialogue, app, api, DashboardAction::ListMedicines).await?
        }
        Command::AddSample => {
            dashboard::run(bot, msg, dialogue, app, api, DashboardAction::AddSample).await?
        }
        Command::Order => {
            dashboard::run(bot, msg, dialogue, app, api, DashboardAction::CreateOrder).await?
        }
        Command::Notifications => {
            dashboard::run(bot, msg, dialogue, app, api, DashboardAction::Notifications).await?
        }
        Command::Logout => dashboard::logout(bot, msg, dialogue, app).await?,
    };

    Ok(())
}

/// Handles plain text, which is either a reply-keyboard button or unknown.
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    dialogue: PharmaDialogue,
    app: App,
    api: SharedApi,
) -> HandlerResult {
    let Some(cmd) = msg.text().and_then(views::command_for_button) else {
        bot.send_message(
            msg.chat.id,
            "I don't understand that. Please use the keyboard or type /help for available commands.",
        )
        .await?;
        return Ok(());
    };
    answer(bot, msg, cmd, dialogue, app, api).await
}
