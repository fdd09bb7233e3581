use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use school_health_confirm::{
    ApiClient, AssentPrompt, ConfirmOptions, ConfirmableItem, ConfirmationKind, ConfirmationOutcome,
    ConfirmationWorkflow, ItemId, NotificationLevel, Notifier, SchoolHealthApi, SchoolHealthConfig, StatusTally,
    TracingNotifier,
};

pub mod medications;
pub mod schedules;
pub mod signups;
pub mod students;

pub use medications::MedicationsCommand;
pub use schedules::SchedulesCommand;
pub use signups::SignupsCommand;
pub use students::StudentsCommand;

/// Prints notifications as they arrive.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Success => println!("✅ {message}"),
            NotificationLevel::Info => println!("ℹ️  {message}"),
            NotificationLevel::Warning => println!("⚠️  {message}"),
            NotificationLevel::Error => eprintln!("❌ {message}"),
        }
    }
}

/// Asks on stdin; anything but y/yes declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinAssent;

#[async_trait]
impl AssentPrompt for StdinAssent {
    async fn confirm(&self, message: &str) -> Result<bool> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(format!("{message} [y/N] ").as_bytes()).await?;
        stdout.flush().await?;

        let mut answer = String::new();
        let read = BufReader::new(tokio::io::stdin()).read_line(&mut answer).await?;
        if read == 0 {
            bail!("stdin closed before an answer was given");
        }
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

pub fn connect(settings: &SchoolHealthConfig) -> Result<Arc<dyn SchoolHealthApi>> {
    let client = ApiClient::from_config(settings)?;
    Ok(Arc::new(client))
}

/// JSON log runs are read by machines, so notifications go to the log there.
pub fn notifier(settings: &SchoolHealthConfig) -> Arc<dyn Notifier> {
    if settings.observability.json_logs {
        Arc::new(TracingNotifier)
    } else {
        Arc::new(TerminalNotifier)
    }
}

/// Parses a user supplied identity. A missing or malformed one fails with
/// `invalid_message` as the only error.
pub fn parse_id(raw: &str, invalid_message: &str) -> Result<ItemId> {
    raw.parse::<ItemId>().map_err(|err| {
        debug!(raw, error = %err, "Rejected item id");
        anyhow!("{invalid_message}")
    })
}

pub fn print_tally(tally: &StatusTally) {
    println!();
    println!(
        "📊 {} total: {} pending, {} confirmed, {} rejected, {} other",
        tally.total(),
        tally.pending,
        tally.confirmed,
        tally.rejected,
        tally.other
    );
}

pub fn print_prompt(kind: ConfirmationKind, subject: &str) {
    let prompt = kind.prompt();
    println!("📝 {}", prompt.title);
    println!("   {}", prompt.subtitle);
    println!("   {subject}");
    println!("   ⚠️  {}", prompt.warning_note);
}

/// Request, ask, then confirm or cancel.
pub async fn run_single<I>(
    workflow: &ConfirmationWorkflow<I>,
    item: I,
    kind: ConfirmationKind,
    options: &ConfirmOptions<I>,
    yes: bool,
) -> Result<()>
where
    I: ConfirmableItem + Clone,
{
    print_prompt(kind, &(options.item_name)(&item));
    workflow.request_confirmation(item);

    if !yes && !StdinAssent.confirm("Proceed?").await? {
        workflow.cancel();
        println!("🚫 Cancelled");
        return Ok(());
    }

    finish(workflow.confirm_pending(options).await)
}

pub fn finish(outcome: Option<ConfirmationOutcome>) -> Result<()> {
    match outcome {
        Some(outcome) if outcome.is_success() => Ok(()),
        Some(outcome) => bail!("{}", outcome.message()),
        None => Ok(()),
    }
}

pub fn show_how_to_use() -> Result<()> {
    println!("🏫 School Health - Confirmation Console");
    println!();
    println!("Review pending records:");
    println!("  📋 school-health signups list --pending");
    println!("  📋 school-health medications list --pending");
    println!();
    println!("Decide:");
    println!("  ✅ school-health signups approve <id>");
    println!("  ✅ school-health signups approve-all --event <id>");
    println!("  ❌ school-health medications reject <id> --reason <text>");
    println!();
    println!("💡 Every decision asks first; pass --yes to skip the prompt.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_error_is_the_invalid_message_alone() {
        assert_eq!(parse_id("42", "bad").unwrap().get(), 42);

        for raw in ["0", "", "abc"] {
            let err = parse_id(raw, "Cannot reject student: Invalid student ID").unwrap_err();
            assert_eq!(format!("{err:#}"), "Cannot reject student: Invalid student ID");
        }
    }
}
