use teloxide::{prelude::*, types::ChatAction};

use super::{dashboard, send_screen, views, HandlerResult, PharmaDialogue, SharedApi};
use crate::app::{App, Screen};
use crate::services::login::AuthMode;
use crate::session::Role;

#[derive(Debug)]
pub enum FormEdit {
    Mode(AuthMode),
    Email(String),
    Password(String),
    Role(Role),
}

async fn already_logged_in(bot: &Bot, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, "You are already logged in. Use /logout first.")
        .await?;
    Ok(())
}

/// Applies one change to the login form and shows the updated form.
pub async fn edit_form(
    bot: Bot,
    msg: Message,
    dialogue: PharmaDialogue,
    mut app: App,
    edit: FormEdit,
) -> HandlerResult {
    let Screen::Login(panel) = app.screen_mut() else {
        return already_logged_in(&bot, msg.chat.id).await;
    };

    let typed_password = matches!(edit, FormEdit::Password(_));
    match edit {
        FormEdit::Mode(mode) => panel.mode = mode,
        FormEdit::Email(email) => panel.email = email,
        FormEdit::Password(password) => panel.password = password,
        FormEdit::Role(role) => panel.role = role,
    }

    let screen = views::render(&app);
    dialogue.update(app).await?;

    if typed_password {
        if let Err(e) = bot.delete_message(msg.chat.id, msg.id).await {
            log::warn!("Could not delete password message: {}", e);
        }
    }
    send_screen(&bot, msg.chat.id, screen).await
}

/// Submits the login form. On success the chat switches to the dashboard,
/// otherwise the form is shown again with the error.
pub async fn submit(
    bot: Bot,
    msg: Message,
    dialogue: PharmaDialogue,
    mut app: App,
    api: SharedApi,
) -> HandlerResult {
    let Screen::Login(panel) = app.screen_mut() else {
        return already_logged_in(&bot, msg.chat.id).await;
    };

    bot.send_chat_action(msg.chat.id, ChatAction::Typing).await?;
    match panel.submit(api.as_ref()).await {
        Some(session) => dashboard::open(&bot, msg.chat.id, dialogue, app, session, api).await,
        None => {
            let screen = views::render(&app);
            dialogue.update(app).await?;
            send_screen(&bot, msg.chat.id, screen).await
        }
    }
}
