use anyhow::{anyhow, Result};
use std::sync::Arc;

use super::{connect, notifier, parse_id, print_tally, run_single};
use crate::cli::StudentAction;
use school_health_confirm::confirmation::{ConfirmStudent, RejectStudent};
use school_health_confirm::{
    ConfirmableItem, ConfirmationKind, ConfirmationWorkflow, InFlightTracker, SchoolHealthConfig, StatusTally, Student,
};

pub struct StudentsCommand {
    action: StudentAction,
}

impl StudentsCommand {
    pub fn new(action: StudentAction) -> Self {
        Self { action }
    }

    pub async fn execute(&self, settings: &SchoolHealthConfig) -> Result<()> {
        let api = connect(settings)?;
        let kind = ConfirmationKind::Student;
        let options = kind.options::<Student>();

        match &self.action {
            StudentAction::List => {
                let students = api.list_students().await?;
                for student in &students {
                    println!(
                        "#{:<6} {:<28} {:<10} {}",
                        student.identity().map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
                        student.display_name(),
                        student.class_name.as_deref().unwrap_or("-"),
                        student.confirmation_status.kind().display()
                    );
                }
                print_tally(&StatusTally::from_items(&students));
                Ok(())
            }
            StudentAction::Confirm { id, yes } => {
                let id = parse_id(id, &options.invalid_id_message)?;
                let student = find(api.list_students().await?, id)?;
                let workflow = ConfirmationWorkflow::<Student>::new(
                    Arc::new(ConfirmStudent::new(api)),
                    InFlightTracker::shared(),
                    notifier(settings),
                );
                run_single(&workflow, student, kind, &options, *yes).await
            }
            StudentAction::Reject { id, reason, yes } => {
                let kind = ConfirmationKind::StudentReject;
                let options = kind.options::<Student>();
                let id = parse_id(id, &options.invalid_id_message)?;
                let student = find(api.list_students().await?, id)?;
                let workflow = ConfirmationWorkflow::<Student>::new(
                    Arc::new(RejectStudent::new(api, reason.as_str())),
                    InFlightTracker::shared(),
                    notifier(settings),
                );
                let options = options.with_success_message(format!("{} has been rejected.", student.display_name()));
                run_single(&workflow, student, kind, &options, *yes).await
            }
        }
    }
}

fn find(students: Vec<Student>, id: school_health_confirm::ItemId) -> Result<Student> {
    students
        .into_iter()
        .find(|s| s.identity() == Some(id))
        .ok_or_else(|| anyhow!("Student {id} not found"))
}
