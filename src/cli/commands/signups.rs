use anyhow::{anyhow, bail, Result};

use super::{connect, finish, notifier, parse_id, print_prompt, print_tally, StdinAssent};
use crate::cli::SignupAction;
use school_health_confirm::{
    AssentPrompt, BulkOutcome, ConfirmableItem, ConfirmationKind, EventSignup, FixedAssent, SchoolHealthConfig,
    SignupBoard,
};

pub struct SignupsCommand {
    action: SignupAction,
}

impl SignupsCommand {
    pub fn new(action: SignupAction) -> Self {
        Self { action }
    }

    pub async fn execute(&self, settings: &SchoolHealthConfig) -> Result<()> {
        let api = connect(settings)?;
        let board = SignupBoard::new(api.clone(), notifier(settings));

        match &self.action {
            SignupAction::List { event, pending } => {
                load(&board, *event).await?;
                let shown = if *pending { board.pending(*event) } else { board.signups() };
                if shown.is_empty() {
                    println!("📭 No signups found");
                }
                for signup in &shown {
                    println!(
                        "#{:<6} {:<28} {:<24} {}",
                        signup.identity().map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
                        signup.student_name.as_deref().unwrap_or("Unknown"),
                        signup.event_title.as_deref().unwrap_or("-"),
                        signup.status.kind().display()
                    );
                }
                print_tally(&board.tally());
                Ok(())
            }
            SignupAction::Approve { id, event, yes } => {
                self.decide(&board, id, *event, *yes, ConfirmationKind::EventSignup).await
            }
            SignupAction::Reject { id, event, yes } => {
                self.decide(&board, id, *event, *yes, ConfirmationKind::EventSignupReject).await
            }
            SignupAction::ApproveAll { event, yes } => {
                load(&board, *event).await?;
                let event = match event {
                    Some(event_id) => Some(
                        api.list_health_events()
                            .await?
                            .into_iter()
                            .find(|e| e.event_id == *event_id)
                            .ok_or_else(|| anyhow!("Health event {event_id} not found"))?,
                    ),
                    None => None,
                };

                let require_confirmation = settings.bulk.require_confirmation && !yes;
                let outcome = if require_confirmation {
                    board.approve_all_pending(event.as_ref(), &StdinAssent, true).await?
                } else {
                    board.approve_all_pending(event.as_ref(), &FixedAssent(true), false).await?
                };

                match outcome {
                    BulkOutcome::Cancelled => println!("🚫 Cancelled"),
                    BulkOutcome::NoOp => {}
                    BulkOutcome::Completed(report) if report.failure_count() > 0 => {
                        bail!("{} signup(s) could not be approved", report.failure_count())
                    }
                    BulkOutcome::Completed(_) => {}
                }
                Ok(())
            }
        }
    }

    async fn decide(
        &self,
        board: &SignupBoard,
        raw_id: &str,
        event: Option<u64>,
        yes: bool,
        kind: ConfirmationKind,
    ) -> Result<()> {
        let id = parse_id(raw_id, &kind.options::<EventSignup>().invalid_id_message)?;
        load(board, event).await?;

        let signup = board.find(id).ok_or_else(|| anyhow!("Signup {id} not found"))?;
        print_prompt(kind, &signup.display_name());

        let requested = match kind {
            ConfirmationKind::EventSignupReject => board.request_rejection(id),
            _ => board.request_approval(id),
        };
        if !requested {
            bail!("Signup {id} not found");
        }

        if !yes && !StdinAssent.confirm("Proceed?").await? {
            board.cancel();
            println!("🚫 Cancelled");
            return Ok(());
        }

        let outcome = match kind {
            ConfirmationKind::EventSignupReject => board.reject(id).await,
            _ => board.approve(id).await,
        };
        finish(outcome)
    }
}

async fn load(board: &SignupBoard, event: Option<u64>) -> Result<()> {
    let count = match event {
        Some(event_id) => board.load_event(event_id).await?,
        None => board.load_all().await?,
    };
    tracing::debug!(count, "Signups loaded");
    Ok(())
}
