use anyhow::{anyhow, Result};
use std::sync::Arc;

use super::{connect, notifier, parse_id, print_tally, run_single};
use crate::cli::MedicationAction;
use school_health_confirm::confirmation::{ConfirmMedicationRequest, RejectMedicationRequest};
use school_health_confirm::{
    ConfirmableItem, ConfirmationKind, ConfirmationWorkflow, InFlightTracker, ItemId, MedicationRequest,
    SchoolHealthApi, SchoolHealthConfig, StatusTally,
};

pub struct MedicationsCommand {
    action: MedicationAction,
}

impl MedicationsCommand {
    pub fn new(action: MedicationAction) -> Self {
        Self { action }
    }

    pub async fn execute(&self, settings: &SchoolHealthConfig) -> Result<()> {
        let api = connect(settings)?;
        let kind = ConfirmationKind::MedicalRequest;
        let options = kind.options::<MedicationRequest>();

        match &self.action {
            MedicationAction::List { pending } => {
                let requests = if *pending {
                    api.list_pending_medication_requests().await?
                } else {
                    api.list_medication_requests().await?
                };
                for request in &requests {
                    println!(
                        "#{:<6} {:<24} {:<20} {:<12} {}",
                        request.identity().map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
                        request.student_name.as_deref().unwrap_or("Unknown"),
                        request.medication_name.as_deref().unwrap_or("-"),
                        request.dosage.as_deref().unwrap_or("-"),
                        request.confirmation_status.kind().display()
                    );
                }
                print_tally(&StatusTally::from_items(&requests));
                Ok(())
            }
            MedicationAction::Confirm { id, yes } => {
                let id = parse_id(id, &options.invalid_id_message)?;
                let request = find(api.as_ref(), id).await?;
                let workflow = ConfirmationWorkflow::<MedicationRequest>::new(
                    Arc::new(ConfirmMedicationRequest::new(api)),
                    InFlightTracker::shared(),
                    notifier(settings),
                );
                run_single(&workflow, request, kind, &options, *yes).await
            }
            MedicationAction::Reject { id, reason, yes } => {
                let kind = ConfirmationKind::MedicalRequestReject;
                let options = kind.options::<MedicationRequest>();
                let id = parse_id(id, &options.invalid_id_message)?;
                let request = find(api.as_ref(), id).await?;
                let workflow = ConfirmationWorkflow::<MedicationRequest>::new(
                    Arc::new(RejectMedicationRequest::new(api, reason.as_str())),
                    InFlightTracker::shared(),
                    notifier(settings),
                );
                let options = options.with_success_message(format!("{} has been rejected.", request.display_name()));
                run_single(&workflow, request, kind, &options, *yes).await
            }
        }
    }
}

async fn find(api: &dyn SchoolHealthApi, id: ItemId) -> Result<MedicationRequest> {
    api.list_medication_requests()
        .await?
        .into_iter()
        .find(|r| r.identity() == Some(id))
        .ok_or_else(|| anyhow!("Medication request {id} not found"))
}
