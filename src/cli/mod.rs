use clap::{Parser, Subcommand};

pub mod commands;

#[derive(Parser)]
#[command(name = "school-health")]
#[command(about = "Confirm pending school health records")]
#[command(long_about = "Review and confirm event signups, student records, medication requests and \
                       medication schedules. Every decision asks before it is sent; bulk approval asks once.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Review and decide health event signups
    Signups {
        #[command(subcommand)]
        command: SignupAction,
    },
    /// Confirm or reject student records
    Students {
        #[command(subcommand)]
        command: StudentAction,
    },
    /// Confirm or reject medication requests
    Medications {
        #[command(subcommand)]
        command: MedicationAction,
    },
    /// Activate medication schedules
    Schedules {
        #[command(subcommand)]
        command: ScheduleAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SignupAction {
    /// List signups with a status tally
    List {
        /// Only show signups for this event
        #[arg(long, help = "Restrict to one health event")]
        event: Option<u64>,
        /// Only show signups still waiting for a decision
        #[arg(long, help = "Only show PENDING signups")]
        pending: bool,
    },
    /// Approve one signup
    Approve {
        id: String,
        #[arg(long, help = "Load signups of this event only")]
        event: Option<u64>,
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    /// Reject one signup
    Reject {
        id: String,
        #[arg(long, help = "Load signups of this event only")]
        event: Option<u64>,
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    /// Approve every pending signup
    ApproveAll {
        #[arg(long, help = "Restrict to one health event")]
        event: Option<u64>,
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum StudentAction {
    /// List students with a status tally
    List,
    /// Confirm one student record
    Confirm {
        id: String,
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    /// Reject one student record
    Reject {
        id: String,
        #[arg(long, help = "Reason shown to the submitter")]
        reason: String,
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum MedicationAction {
    /// List medication requests with a status tally
    List {
        #[arg(long, help = "Only show requests waiting for a nurse")]
        pending: bool,
    },
    /// Confirm one medication request
    Confirm {
        id: String,
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    /// Reject one medication request
    Reject {
        id: String,
        #[arg(long, help = "Reason shown to the parent")]
        reason: String,
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScheduleAction {
    /// List medication schedules with a status tally
    List,
    /// Confirm one medication schedule
    Confirm {
        id: String,
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bulk_approval() {
        let cli = Cli::try_parse_from(["school-health", "signups", "approve-all", "--event", "4", "-y"]).unwrap();
        match cli.command {
            Some(Commands::Signups {
                command: SignupAction::ApproveAll { event, yes },
            }) => {
                assert_eq!(event, Some(4));
                assert!(yes);
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn reject_requires_reason() {
        assert!(Cli::try_parse_from(["school-health", "students", "reject", "7"]).is_err());
        assert!(Cli::try_parse_from(["school-health", "medications", "reject", "7", "--reason", "expired"]).is_ok());
    }
}
