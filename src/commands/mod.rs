use crate::pickle::{embed, parse_players, Action, Board, Session};
use crate::{Context, Error};

use poise::serenity_prelude as serenity;
use rand::Rng;
use serenity::{
    ComponentInteraction, CreateActionRow, CreateAttachment, CreateButton, CreateEmbed,
    CreateInteractionResponse,
};
use std::future::IntoFuture;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const ABOUT: &str = "
A [Discord Bot](https://discord.com/developers/docs/intro#bots-and-apps) for pickleball stuff

Current commands are:
* `about`:  Show information about Pickle Bot
* `match`: Open a helper to generate pickleball matches
";

/// The fields of the Edit dialog, prefilled from the current session
#[derive(Debug, Clone, PartialEq, Eq, poise::Modal)]
#[name = "Generate pickleball matches"]
struct EditModal {
    #[name = "Singles court(s)"]
    #[placeholder = "Number of courts"]
    singles: String,
    #[name = "Doubles court(s)"]
    #[placeholder = "Number of courts"]
    doubles: String,
    #[name = "Player name(s)"]
    #[placeholder = "Comma-separated list of names"]
    #[paragraph]
    players: String,
}

impl EditModal {
    fn from_session(session: &Session) -> Self {
        EditModal {
            singles: session.singles().to_string(),
            doubles: session.doubles().to_string(),
            players: session.players_input(),
        }
    }
}

/// A group of pickleball commands
#[poise::command(slash_command, subcommands("about", "match_"), subcommand_required)]
pub async fn pickle(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Information about Pickle Bot
#[poise::command(slash_command)]
pub async fn about(ctx: Context<'_>) -> Result<(), Error> {
    let settings = &ctx.data().settings;

    let mut embed = CreateEmbed::new()
        .title("About **Pickle Bot**")
        .description(ABOUT);
    let mut reply = poise::CreateReply::default()
        .ephemeral(true)
        .components(vec![CreateActionRow::Buttons(vec![
            CreateButton::new_link(&settings.repository_url).label("GitHub"),
        ])]);

    match CreateAttachment::path(&settings.about_image).await {
        Ok(attachment) => {
            embed = embed.image(format!("attachment://{}", attachment.filename));
            reply = reply.attachment(attachment);
        }
        Err(why) => {
            warn!(
                "Could not attach {}: {}",
                settings.about_image.display(),
                why
            );
        }
    }

    ctx.send(reply.embed(embed)).await?;
    Ok(())
}

/// What a button press should be answered with
#[derive(Debug, PartialEq, Eq)]
enum Reply {
    /// Redraw the message in place
    Update,
    /// Open the Edit dialog with these defaults
    OpenDialog(EditModal),
}

/// The state behind one `/pickle match` message. Handling a press never waits
/// on the user, so an open dialog cannot hold up other buttons.
struct MatchState {
    session: Session,
    board: Board,
    max_courts: usize,
}

impl MatchState {
    fn new<R: Rng + ?Sized>(rng: &mut R, session: Session, max_courts: usize) -> Self {
        let board = session.generate(rng, max_courts);
        MatchState {
            session,
            board,
            max_courts,
        }
    }

    fn press<R: Rng + ?Sized>(&mut self, rng: &mut R, action: Action) -> Reply {
        match action {
            Action::Generate => {
                self.board = self.session.generate(rng, self.max_courts);
                Reply::Update
            }
            Action::Team { court, side } => {
                if !self.board.record(court, side) {
                    warn!("No court {} to record a result on", court);
                }
                Reply::Update
            }
            Action::Edit => Reply::OpenDialog(EditModal::from_session(&self.session)),
        }
    }

    /// Replaces the session with a submitted dialog and draws new courts
    fn submit<R: Rng + ?Sized>(&mut self, rng: &mut R, dialog: EditModal) {
        self.session = Session::from_input(&dialog.singles, &dialog.doubles, &dialog.players);
        self.board = self.session.generate(rng, self.max_courts);
    }
}

type DialogResult = (
    ComponentInteraction,
    Result<Option<EditModal>, serenity::Error>,
);

/// Owned handle so the dialog wait can run in its own task
struct DialogContext(serenity::Context);

impl AsRef<serenity::Context> for DialogContext {
    fn as_ref(&self) -> &serenity::Context {
        &self.0
    }
}

/// Shows the Edit dialog and reports the outcome on `dialogs` once the user
/// submits it or it times out
fn open_dialog(
    ctx: &serenity::Context,
    press: ComponentInteraction,
    defaults: EditModal,
    timeout: Duration,
    dialogs: mpsc::UnboundedSender<DialogResult>,
) {
    let ctx = DialogContext(ctx.clone());
    tokio::spawn(async move {
        let submitted = poise::execute_modal_on_component_interaction(
            ctx,
            press.clone(),
            Some(defaults),
            Some(timeout),
        )
        .await;
        // the session may have expired while the dialog was open
        let _ = dialogs.send((press, submitted));
    });
}

/// Logs a failed reply to a single press. Returns whether it went through.
fn report<T>(session_id: u64, what: &str, result: Result<T, serenity::Error>) -> bool {
    match result {
        Ok(_) => true,
        Err(why) => {
            warn!("Session {}: could not {}: {}", session_id, what, why);
            false
        }
    }
}

/// Generate random pickleball matches
#[poise::command(slash_command, rename = "match")]
pub async fn match_(
    ctx: Context<'_>,
    #[description = "Comma-separated list of player names"] players: String,
    #[description = "Number of singles courts"] singles: Option<u32>,
    #[description = "Number of doubles courts"] doubles: Option<u32>,
) -> Result<(), Error> {
    let settings = &ctx.data().settings;
    let session_id = ctx.id();

    let session = Session::new(
        singles.unwrap_or(0).to_string(),
        doubles.unwrap_or(0).to_string(),
        parse_players(&players),
    );
    let mut state = MatchState::new(&mut rand::thread_rng(), session, settings.max_courts);

    ctx.send(embed::board_reply(&state.board, session_id).ephemeral(true))
        .await?;

    let (dialog_tx, mut dialog_rx) = mpsc::unbounded_channel::<DialogResult>();

    loop {
        let presses = serenity::ComponentInteractionCollector::new(ctx.serenity_context())
            .filter(move |press| press.data.custom_id.starts_with(&format!("{}:", session_id)))
            .timeout(settings.session_timeout());

        tokio::select! {
            press = presses.into_future() => {
                let Some(press) = press else {
                    break;
                };
                let Some(action) = Action::parse(session_id, &press.data.custom_id) else {
                    debug!("Ignoring unknown component {}", press.data.custom_id);
                    continue;
                };
                debug!("Session {} got {:?} from {}", session_id, action, press.user.name);

                let reply = state.press(&mut rand::thread_rng(), action);
                match reply {
                    Reply::Update => {
                        let response = CreateInteractionResponse::UpdateMessage(
                            embed::board_update(&state.board, session_id),
                        );
                        report(
                            session_id,
                            "update the message",
                            press.create_response(ctx.serenity_context(), response).await,
                        );
                    }
                    Reply::OpenDialog(defaults) => open_dialog(
                        ctx.serenity_context(),
                        press,
                        defaults,
                        settings.modal_timeout(),
                        dialog_tx.clone(),
                    ),
                }
            }
            Some((press, submitted)) = dialog_rx.recv() => {
                let dialog = match submitted {
                    Ok(Some(dialog)) => dialog,
                    Ok(None) => {
                        debug!("Edit dialog for session {} closed without a submission", session_id);
                        continue;
                    }
                    Err(why) => {
                        warn!("Session {}: edit dialog failed: {}", session_id, why);
                        continue;
                    }
                };

                state.submit(&mut rand::thread_rng(), dialog);
                report(
                    session_id,
                    "apply the edit",
                    press
                        .edit_followup(
                            ctx.serenity_context(),
                            press.message.id,
                            embed::board_followup(&state.board, session_id),
                        )
                        .await,
                );
            }
        }
    }

    info!("Session {} expired", session_id);
    Ok(())
}
