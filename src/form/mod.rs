use thiserror::Error;

use crate::api::{ApiError, Backend};
use crate::model::{StudentPayload, StudentRecord};
use crate::notify::{self, Notifier};
use crate::store::RecordStore;
use crate::utils;

pub const CREATED_MESSAGE: &str = "Student registered successfully!";
pub const UPDATED_MESSAGE: &str = "Student updated successfully!";
pub const EDIT_LOAD_FAILED_MESSAGE: &str = "Failed to load student data!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Create,
    Edit {
        registration_code: String,
    },
}

impl FormMode {
    pub fn submit_label(&self) -> &'static str {
        match self {
            FormMode::Create => "Register Student",
            FormMode::Edit { .. } => "Update Student",
        }
    }

    pub fn submit_style(&self) -> ButtonStyle {
        match self {
            FormMode::Create => ButtonStyle::Primary,
            FormMode::Edit { .. } => ButtonStyle::Warning,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, FormMode::Edit { .. })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("full name is required")]
    MissingName,

    #[error("invalid monthly fee: {0}")]
    InvalidFee(String),

    #[error("monthly fee must not be negative")]
    NegativeFee,

    #[error("unknown form field '{0}'")]
    UnknownField(String),

    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FormError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created,
    Updated { registration_code: String },
}

/// Field values as the user typed them; the fee stays text until submit.
#[derive(Clone, Debug, PartialEq)]
pub struct StudentForm {
    pub full_name: String,
    pub registration_code: String,
    pub email: String,
    pub monthly_fee: String,
    pub active: bool,
}

impl Default for StudentForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            registration_code: String::new(),
            email: String::new(),
            monthly_fee: String::new(),
            active: true,
        }
    }
}

impl StudentForm {
    pub fn from_record(record: &StudentRecord) -> Self {
        Self {
            full_name: record.full_name.clone(),
            registration_code: record.registration_code.clone(),
            email: record.email.clone(),
            monthly_fee: record.monthly_fee.to_string(),
            active: record.active,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn to_payload(&self) -> Result<StudentPayload, FormError> {
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            return Err(FormError::MissingName);
        }
        let monthly_fee = utils::parse_amount(&self.monthly_fee).map_err(FormError::InvalidFee)?;
        if monthly_fee < 0.0 {
            return Err(FormError::NegativeFee);
        }
        Ok(StudentPayload {
            full_name: full_name.to_string(),
            registration_code: self.registration_code.trim().to_string(),
            email: self.email.trim().to_string(),
            monthly_fee,
            active: self.active,
        })
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        match field.trim().to_lowercase().as_str() {
            "name" | "full_name" | "nomecompleto" => self.full_name = value.to_string(),
            "ra" | "code" | "registration_code" => self.registration_code = value.to_string(),
            "email" => self.email = value.to_string(),
            "fee" | "monthly_fee" | "mensalidade" => self.monthly_fee = value.to_string(),
            "active" | "ativo" => {
                self.active = utils::parse_bool(value).map_err(|message| {
                    FormError::InvalidValue {
                        field: "active".to_string(),
                        message,
                    }
                })?
            }
            other => return Err(FormError::UnknownField(other.to_string())),
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct FormController {
    mode: FormMode,
    form: StudentForm,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn form(&self) -> &StudentForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut StudentForm {
        &mut self.form
    }

    /// Loads the record addressed by `registration_code` into the form and
    /// switches to edit mode. A failed lookup leaves mode and fields alone.
    pub async fn edit<B>(
        &mut self,
        registration_code: &str,
        backend: &B,
        notifier: &dyn Notifier,
    ) -> Result<(), ApiError>
    where
        B: Backend + ?Sized,
    {
        match backend.get_student(registration_code).await {
            Ok(record) => {
                tracing::debug!(ra = registration_code, "entering edit mode");
                self.form = StudentForm::from_record(&record);
                self.mode = FormMode::Edit {
                    registration_code: registration_code.to_string(),
                };
                Ok(())
            }
            Err(e) => {
                tracing::warn!(ra = registration_code, error = %e, "student lookup failed");
                notifier.error(EDIT_LOAD_FAILED_MESSAGE);
                Err(e)
            }
        }
    }

    /// Creates or updates depending on the current mode. On success the form
    /// returns to a blank create form and the store is refreshed; on failure
    /// nothing about the form changes.
    pub async fn submit<B>(
        &mut self,
        backend: &B,
        store: &mut RecordStore,
        notifier: &dyn Notifier,
    ) -> Result<SubmitOutcome, SubmitError>
    where
        B: Backend + ?Sized,
    {
        let payload = match self.form.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                notifier.error(&e.to_string());
                return Err(e.into());
            }
        };

        let result = match &self.mode {
            FormMode::Create => backend
                .create_student(&payload)
                .await
                .map(|_| SubmitOutcome::Created),
            FormMode::Edit { registration_code } => backend
                .update_student(registration_code, &payload)
                .await
                .map(|_| SubmitOutcome::Updated {
                    registration_code: registration_code.clone(),
                }),
        };

        match result {
            Ok(outcome) => {
                let message = match outcome {
                    SubmitOutcome::Created => CREATED_MESSAGE,
                    SubmitOutcome::Updated { .. } => UPDATED_MESSAGE,
                };
                tracing::info!(ra = %payload.registration_code, ?outcome, "student saved");
                notifier.success(message);
                self.reset();
                // a failed refresh is already reported by the store
                let _ = store.refresh(backend, notifier).await;
                Ok(outcome)
            }
            Err(e) => {
                notifier.error(&notify::failure_message(&e));
                Err(e.into())
            }
        }
    }

    pub fn reset(&mut self) {
        self.mode = FormMode::Create;
        self.form.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{student, FakeBackend, RecordingNotifier};

    fn filled_form() -> StudentForm {
        StudentForm {
            full_name: "Carla Souza".to_string(),
            registration_code: "C3".to_string(),
            email: "carla@example.com".to_string(),
            monthly_fee: "180.50".to_string(),
            active: false,
        }
    }

    #[test]
    fn labels_follow_mode() {
        let create = FormMode::Create;
        let edit = FormMode::Edit {
            registration_code: "A1".to_string(),
        };
        assert_eq!(create.submit_label(), "Register Student");
        assert_eq!(create.submit_style(), ButtonStyle::Primary);
        assert_eq!(edit.submit_label(), "Update Student");
        assert_eq!(edit.submit_style(), ButtonStyle::Warning);
    }

    #[test]
    fn payload_rejects_bad_fee_and_missing_name() {
        let mut form = filled_form();
        form.monthly_fee = "abc".to_string();
        assert!(matches!(form.to_payload(), Err(FormError::InvalidFee(_))));
        form.monthly_fee = "-1".to_string();
        assert_eq!(form.to_payload(), Err(FormError::NegativeFee));
        form.monthly_fee = "1".to_string();
        form.full_name = "  ".to_string();
        assert_eq!(form.to_payload(), Err(FormError::MissingName));
    }

    #[test]
    fn set_field_accepts_wire_aliases() {
        let mut form = StudentForm::default();
        form.set_field("nomeCompleto", "Ana").unwrap();
        form.set_field("mensalidade", "10").unwrap();
        form.set_field("ativo", "false").unwrap();
        assert_eq!(form.full_name, "Ana");
        assert_eq!(form.monthly_fee, "10");
        assert!(!form.active);
        assert!(form.set_field("phone", "x").is_err());
        assert!(form.set_field("active", "maybe").is_err());
    }

    #[tokio::test]
    async fn create_success_resets_form_and_refreshes() {
        let backend = FakeBackend::default();
        let notifier = RecordingNotifier::default();
        let mut store = RecordStore::new();
        let mut ctl = FormController::new();
        *ctl.form_mut() = filled_form();

        let outcome = ctl.submit(&backend, &mut store, &notifier).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Created);
        assert_eq!(ctl.mode(), &FormMode::Create);
        assert_eq!(ctl.form(), &StudentForm::default());
        assert!(ctl.form().active);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get()[0].registration_code, "C3");
        assert_eq!(notifier.successes(), vec![CREATED_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn create_failure_keeps_fields_and_shows_server_text() {
        let backend = FakeBackend::default();
        backend.reject_with(400, "RA já cadastrado");
        let notifier = RecordingNotifier::default();
        let mut store = RecordStore::new();
        let mut ctl = FormController::new();
        *ctl.form_mut() = filled_form();

        assert!(ctl.submit(&backend, &mut store, &notifier).await.is_err());
        assert_eq!(ctl.mode(), &FormMode::Create);
        assert_eq!(ctl.form(), &filled_form());
        assert_eq!(notifier.errors(), vec!["RA já cadastrado".to_string()]);
        assert_eq!(backend.list_calls(), 0);
    }

    #[tokio::test]
    async fn edit_populates_all_fields() {
        let record = student(4, "D4", "Diego Lima", 320.75, false);
        let backend = FakeBackend::with_students(vec![record.clone()]);
        let notifier = RecordingNotifier::default();
        let mut ctl = FormController::new();

        ctl.edit("D4", &backend, &notifier).await.unwrap();
        assert_eq!(
            ctl.mode(),
            &FormMode::Edit {
                registration_code: "D4".to_string()
            }
        );
        let form = ctl.form();
        assert_eq!(form.full_name, record.full_name);
        assert_eq!(form.registration_code, record.registration_code);
        assert_eq!(form.email, record.email);
        assert_eq!(form.monthly_fee, "320.75");
        assert!(!form.active);
    }

    #[tokio::test]
    async fn unmodified_update_round_trips_record() {
        let record = student(4, "D4", "Diego Lima", 320.75, false);
        let backend = FakeBackend::with_students(vec![record.clone()]);
        let notifier = RecordingNotifier::default();
        let mut store = RecordStore::new();
        let mut ctl = FormController::new();

        ctl.edit("D4", &backend, &notifier).await.unwrap();
        let outcome = ctl.submit(&backend, &mut store, &notifier).await.unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Updated {
                registration_code: "D4".to_string()
            }
        );
        assert_eq!(backend.get_student("D4").await.unwrap(), record);
        assert_eq!(ctl.mode(), &FormMode::Create);
        assert_eq!(ctl.form(), &StudentForm::default());
    }

    #[tokio::test]
    async fn failed_update_stays_in_edit_mode() {
        let backend = FakeBackend::with_students(vec![student(4, "D4", "Diego", 10.0, true)]);
        let notifier = RecordingNotifier::default();
        let mut store = RecordStore::new();
        let mut ctl = FormController::new();

        ctl.edit("D4", &backend, &notifier).await.unwrap();
        ctl.form_mut().email = "new@example.com".to_string();
        let before = ctl.form().clone();
        backend.reject_with(422, "email inválido");

        assert!(ctl.submit(&backend, &mut store, &notifier).await.is_err());
        assert!(ctl.mode().is_edit());
        assert_eq!(ctl.form(), &before);
        assert_eq!(notifier.errors(), vec!["email inválido".to_string()]);
    }

    #[tokio::test]
    async fn failed_lookup_keeps_current_mode() {
        let backend = FakeBackend::with_students(vec![student(1, "A1", "Ana", 1.0, true)]);
        let notifier = RecordingNotifier::default();
        let mut ctl = FormController::new();

        ctl.edit("A1", &backend, &notifier).await.unwrap();
        assert!(ctl.edit("ZZ", &backend, &notifier).await.is_err());
        assert_eq!(
            ctl.mode(),
            &FormMode::Edit {
                registration_code: "A1".to_string()
            }
        );
        assert_eq!(notifier.errors(), vec![EDIT_LOAD_FAILED_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn edit_switches_between_records() {
        let backend = FakeBackend::with_students(vec![
            student(1, "A1", "Ana", 1.0, true),
            student(2, "B2", "Bruno", 2.0, true),
        ]);
        let notifier = RecordingNotifier::default();
        let mut ctl = FormController::new();

        ctl.edit("A1", &backend, &notifier).await.unwrap();
        ctl.edit("B2", &backend, &notifier).await.unwrap();
        assert_eq!(
            ctl.mode(),
            &FormMode::Edit {
                registration_code: "B2".to_string()
            }
        );
        assert_eq!(ctl.form().full_name, "Bruno");
    }

    #[tokio::test]
    async fn reset_returns_to_create_from_edit() {
        let backend = FakeBackend::with_students(vec![student(1, "A1", "Ana", 1.0, false)]);
        let notifier = RecordingNotifier::default();
        let mut ctl = FormController::new();

        ctl.edit("A1", &backend, &notifier).await.unwrap();
        ctl.reset();
        assert_eq!(ctl.mode(), &FormMode::Create);
        assert_eq!(ctl.form(), &StudentForm::default());
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_backend() {
        let backend = FakeBackend::default();
        let notifier = RecordingNotifier::default();
        let mut store = RecordStore::new();
        let mut ctl = FormController::new();
        ctl.form_mut().monthly_fee = "12".to_string();

        let err = ctl.submit(&backend, &mut store, &notifier).await.unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(FormError::MissingName)));
        assert!(backend.students().is_empty());
        assert_eq!(notifier.errors(), vec!["full name is required".to_string()]);
    }
}
