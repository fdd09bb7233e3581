use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{ItemId, ItemStatus};

/// Anything that goes through the pending → confirmed/rejected lifecycle.
pub trait ConfirmableItem: Send + Sync {
    /// `None` means the item cannot be confirmed at all.
    fn identity(&self) -> Option<ItemId>;

    /// Human readable label used in notifications.
    fn display_name(&self) -> String;

    fn status(&self) -> &ItemStatus;

    fn set_status(&mut self, status: ItemStatus);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub student_id: Option<u64>,
    #[serde(default)]
    pub student_code: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub confirmation_status: ItemStatus,
}

impl ConfirmableItem for Student {
    fn identity(&self) -> Option<ItemId> {
        ItemId::from_raw(self.student_id)
    }

    fn display_name(&self) -> String {
        non_empty(self.full_name.as_deref())
            .or_else(|| non_empty(self.student_code.as_deref()))
            .unwrap_or("Unknown")
            .to_string()
    }

    fn status(&self) -> &ItemStatus {
        &self.confirmation_status
    }

    fn set_status(&mut self, status: ItemStatus) {
        self.confirmation_status = status;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSignup {
    pub signup_id: Option<u64>,
    #[serde(default)]
    pub event_id: Option<u64>,
    #[serde(default)]
    pub event_title: Option<String>,
    #[serde(default)]
    pub student_id: Option<u64>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub student_code: Option<String>,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default)]
    pub signup_date: Option<NaiveDateTime>,
}

impl ConfirmableItem for EventSignup {
    fn identity(&self) -> Option<ItemId> {
        ItemId::from_raw(self.signup_id)
    }

    fn display_name(&self) -> String {
        format!(
            "Event signup for {}",
            non_empty(self.student_name.as_deref()).unwrap_or("Unknown")
        )
    }

    fn status(&self) -> &ItemStatus {
        &self.status
    }

    fn set_status(&mut self, status: ItemStatus) {
        self.status = status;
    }
}

/// A parent's request for medication to be given at school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    #[serde(alias = "id")]
    pub request_id: Option<u64>,
    #[serde(default)]
    pub student_id: Option<u64>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub medication_name: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub confirmation_status: ItemStatus,
    #[serde(default)]
    pub unconfirm_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl ConfirmableItem for MedicationRequest {
    fn identity(&self) -> Option<ItemId> {
        ItemId::from_raw(self.request_id)
    }

    fn display_name(&self) -> String {
        match self.identity() {
            Some(id) => format!("Medical Request #{id}"),
            None => "Medical Request #Unknown".to_string(),
        }
    }

    fn status(&self) -> &ItemStatus {
        &self.confirmation_status
    }

    fn set_status(&mut self, status: ItemStatus) {
        self.confirmation_status = status;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationSchedule {
    #[serde(alias = "id")]
    pub schedule_id: Option<u64>,
    #[serde(default)]
    pub student_id: Option<u64>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub request_id: Option<u64>,
    #[serde(default)]
    pub medication_name: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub scheduled_time: Option<NaiveTime>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub administered_by: Option<String>,
    #[serde(default)]
    pub dispensed_quantity: Option<u32>,
    #[serde(default)]
    pub status: ItemStatus,
}

impl ConfirmableItem for MedicationSchedule {
    fn identity(&self) -> Option<ItemId> {
        ItemId::from_raw(self.schedule_id)
    }

    fn display_name(&self) -> String {
        format!(
            "Medication Schedule for {}",
            non_empty(self.student_name.as_deref()).unwrap_or("Unknown")
        )
    }

    fn status(&self) -> &ItemStatus {
        &self.status
    }

    fn set_status(&mut self, status: ItemStatus) {
        self.status = status;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthEvent {
    pub event_id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub schedule_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl HealthEvent {
    pub fn display_title(&self) -> &str {
        non_empty(self.title.as_deref()).unwrap_or("Unknown Event")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signup_parses_backend_payload() {
        let signup: EventSignup = serde_json::from_value(json!({
            "signupId": 101,
            "eventId": 5,
            "eventTitle": "Flu vaccination",
            "studentId": 9,
            "studentName": "An Nguyen",
            "status": "PENDING",
            "signupDate": "2025-03-01T08:30:00"
        }))
        .unwrap();

        assert_eq!(signup.identity(), ItemId::new(101));
        assert!(signup.status().is_pending());
        assert_eq!(signup.display_name(), "Event signup for An Nguyen");
    }

    #[test]
    fn student_name_falls_back_to_code() {
        let student: Student = serde_json::from_value(json!({
            "studentId": 3,
            "studentCode": "HS-003",
            "fullName": "",
            "confirmationStatus": "pending"
        }))
        .unwrap();
        assert_eq!(student.display_name(), "HS-003");

        let anonymous: Student = serde_json::from_value(json!({ "studentId": null })).unwrap();
        assert_eq!(anonymous.display_name(), "Unknown");
        assert_eq!(anonymous.identity(), None);
    }

    #[test]
    fn medication_request_accepts_either_key() {
        let by_request_id: MedicationRequest =
            serde_json::from_value(json!({ "requestId": 12 })).unwrap();
        let by_id: MedicationRequest = serde_json::from_value(json!({ "id": 12 })).unwrap();
        assert_eq!(by_request_id.identity(), by_id.identity());
        assert_eq!(by_id.display_name(), "Medical Request #12");

        let missing: MedicationRequest = serde_json::from_value(json!({ "requestId": 0 })).unwrap();
        assert_eq!(missing.display_name(), "Medical Request #Unknown");
    }

    #[test]
    fn set_status_keeps_raw_text() {
        let mut schedule: MedicationSchedule =
            serde_json::from_value(json!({ "scheduleId": 4, "studentName": "Binh" })).unwrap();
        assert_eq!(schedule.display_name(), "Medication Schedule for Binh");

        schedule.set_status(ItemStatus::from_raw("Confirmed"));
        assert_eq!(schedule.status().raw(), "Confirmed");
        assert!(schedule.status().is_confirmed());
    }
}
