use anyhow::{anyhow, Result};
use std::sync::Arc;

use super::{connect, notifier, parse_id, print_tally, run_single};
use crate::cli::ScheduleAction;
use school_health_confirm::confirmation::ConfirmMedicationSchedule;
use school_health_confirm::{
    ConfirmableItem, ConfirmationKind, ConfirmationWorkflow, InFlightTracker, MedicationSchedule, SchoolHealthConfig,
    StatusTally,
};

pub struct SchedulesCommand {
    action: ScheduleAction,
}

impl SchedulesCommand {
    pub fn new(action: ScheduleAction) -> Self {
        Self { action }
    }

    pub async fn execute(&self, settings: &SchoolHealthConfig) -> Result<()> {
        let api = connect(settings)?;
        let schedules = api.list_medication_schedules().await?;

        match &self.action {
            ScheduleAction::List => {
                for schedule in &schedules {
                    println!(
                        "#{:<6} {:<24} {:<20} {:<12} {}",
                        schedule.identity().map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
                        schedule.student_name.as_deref().unwrap_or("Unknown"),
                        schedule.medication_name.as_deref().unwrap_or("-"),
                        schedule
                            .scheduled_date
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        schedule.status.kind().display()
                    );
                }
                print_tally(&StatusTally::from_items(&schedules));
                Ok(())
            }
            ScheduleAction::Confirm { id, yes } => {
                let kind = ConfirmationKind::MedicationSchedule;
                let options = kind.options::<MedicationSchedule>();
                let id = parse_id(id, &options.invalid_id_message)?;
                let schedule = schedules
                    .into_iter()
                    .find(|s| s.identity() == Some(id))
                    .ok_or_else(|| anyhow!("Medication schedule {id} not found"))?;
                let workflow = ConfirmationWorkflow::<MedicationSchedule>::new(
                    Arc::new(ConfirmMedicationSchedule::new(api)),
                    InFlightTracker::shared(),
                    notifier(settings),
                );
                run_single(&workflow, schedule, kind, &options, *yes).await
            }
        }
    }
}
