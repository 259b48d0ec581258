use chrono::Utc;
use teloxide::{
    net::Download,
    prelude::*,
    types::{Document, FileMeta, PhotoSize},
};

use super::{send_screen, views, HandlerResult, PharmaDialogue, SharedApi};
use crate::api::models::PrescriptionUpload;
use crate::app::{App, Screen};
use crate::services::dashboard::DashboardPanel;
use crate::session::Session;

const DOCUMENT_FILE_NAME: &str = "prescription";
const PHOTO_FILE_NAME: &str = "prescription.jpg";
const PHOTO_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug)]
pub enum DashboardAction {
    Scan(String),
    ListMedicines,
    AddSample,
    CreateOrder,
    Notifications,
}

async fn prompt_login(bot: &Bot, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, "Please log in first. Type /start to see the form.")
        .await?;
    Ok(())
}

/// Switches the chat to a freshly mounted dashboard for `session`.
pub async fn open(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: PharmaDialogue,
    mut app: App,
    session: Session,
    api: SharedApi,
) -> HandlerResult {
    log::info!("Opening dashboard for chat {} as {}", chat_id, session.role());
    let mut panel = DashboardPanel::new(session);
    let mounted = panel.mount(api.as_ref()).await;
    app.sign_in(panel);

    let screen = views::render(&app);
    dialogue.update(app).await?;
    send_screen(bot, chat_id, screen).await?;

    // Not handled: a failed notification fetch goes to the dispatcher's error handler.
    mounted?;
    Ok(())
}

/// Runs one dashboard action and shows the refreshed dashboard.
///
/// Request failures are intentionally left unhandled. They abort the action
/// before the state is saved and are only reported by the dispatcher's error
/// handler, so the user keeps seeing the previous view.
pub async fn run(
    bot: Bot,
    msg: Message,
    dialogue: PharmaDialogue,
    mut app: App,
    api: SharedApi,
    action: DashboardAction,
) -> HandlerResult {
    let Screen::Dashboard(panel) = app.screen_mut() else {
        return prompt_login(&bot, msg.chat.id).await;
    };

    log::info!("Running {:?} for chat {}", action, msg.chat.id);
    let api = api.as_ref();
    match action {
        DashboardAction::Scan(code) => {
            let code = code.trim();
            if !code.is_empty() {
                panel.scan_code = code.to_string();
            }
            panel.scan(api).await?;
        }
        DashboardAction::ListMedicines => panel.list_medicines(api).await?,
        DashboardAction::AddSample => {
            panel.add_sample_medicine(api, Utc::now()).await?;
        }
        DashboardAction::CreateOrder => panel.create_order(api).await?,
        DashboardAction::Notifications => panel.check_notifications(api).await?,
    }

    let screen = views::render(&app);
    dialogue.update(app).await?;
    send_screen(&bot, msg.chat.id, screen).await
}

/// The Telegram file behind a prescription message, named for the upload.
#[derive(Debug)]
pub struct PrescriptionFile<'a> {
    pub file: &'a FileMeta,
    pub file_name: String,
    pub mime_type: Option<String>,
}

impl PrescriptionFile<'_> {
    pub fn into_upload(self, bytes: Vec<u8>) -> PrescriptionUpload {
        PrescriptionUpload {
            file_name: self.file_name,
            mime_type: self.mime_type,
            bytes,
        }
    }
}

/// Picks the file to upload: the document if there is one, otherwise the
/// largest size of the photo.
pub fn prescription_file<'a>(
    document: Option<&'a Document>,
    photo: Option<&'a [PhotoSize]>,
) -> Option<PrescriptionFile<'a>> {
    if let Some(document) = document {
        return Some(PrescriptionFile {
            file: &document.file,
            file_name: document
                .file_name
                .clone()
                .unwrap_or_else(|| DOCUMENT_FILE_NAME.to_string()),
            mime_type: document.mime_type.as_ref().map(ToString::to_string),
        });
    }

    let largest = photo?
        .iter()
        .max_by_key(|size| u64::from(size.width) * u64::from(size.height))?;
    Some(PrescriptionFile {
        file: &largest.file,
        file_name: PHOTO_FILE_NAME.to_string(),
        mime_type: Some(PHOTO_MIME_TYPE.to_string()),
    })
}

/// Uploads a document or photo sent to the chat as the user's prescription
/// and replies with the stored file URL.
pub async fn upload_prescription(bot: Bot, msg: Message, app: App, api: SharedApi) -> HandlerResult {
    let Screen::Dashboard(panel) = app.screen() else {
        return prompt_login(&bot, msg.chat.id).await;
    };
    let Some(source) = prescription_file(msg.document(), msg.photo()) else {
        return Ok(());
    };

    log::info!(
        "Uploading prescription {} for chat {}",
        source.file_name,
        msg.chat.id
    );
    let file = bot.get_file(source.file.id.clone()).await?;
    let mut bytes = Vec::new();
    bot.download_file(&file.path, &mut bytes).await?;

    // Unhandled like every other dashboard request.
    let alert = panel
        .upload_prescription(api.as_ref(), source.into_upload(bytes))
        .await?;
    bot.send_message(msg.chat.id, alert).await?;
    Ok(())
}

pub async fn logout(bot: Bot, msg: Message, dialogue: PharmaDialogue, mut app: App) -> HandlerResult {
    if app.session().is_none() {
        return prompt_login(&bot, msg.chat.id).await;
    }
    log::info!("Logging out chat {}", msg.chat.id);
    app.logout();

    let screen = views::render(&app);
    dialogue.update(app).await?;
    send_screen(&bot, msg.chat.id, screen).await
}
