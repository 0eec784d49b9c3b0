use crate::api::{ApiError, Backend};
use crate::form::{FormController, SubmitError, SubmitOutcome};
use crate::model::{BillingNotice, StudentRecord};
use crate::notice::{self, CreateNoticeError, NoticeCreated, NoticeDraft, NoticeError};
use crate::notify::{Confirm, Notifier};
use crate::output;
use crate::store::RecordStore;

pub const DEACTIVATE_PROMPT: &str = "Do you really want to deactivate this student?";
pub const DEACTIVATED_MESSAGE: &str = "Student deactivated successfully!";
pub const DEACTIVATE_FAILED_MESSAGE: &str = "Failed to deactivate student!";
pub const CHOICES_FAILED_MESSAGE: &str = "Failed to load students for selection.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deactivation {
    Cancelled,
    Done,
}

pub struct Session<B: Backend, N: Notifier> {
    backend: B,
    notifier: N,
    store: RecordStore,
    controller: FormController,
    draft: NoticeDraft,
    search: String,
}

impl<B: Backend, N: Notifier> Session<B, N> {
    pub fn new(backend: B, notifier: N) -> Self {
        Self {
            backend,
            notifier,
            store: RecordStore::new(),
            controller: FormController::new(),
            draft: NoticeDraft::default(),
            search: String::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FormController {
        &mut self.controller
    }

    pub fn draft(&self) -> &NoticeDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut NoticeDraft {
        &mut self.draft
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    /// The records currently on display: the snapshot narrowed by the search term.
    pub fn view(&self) -> Vec<StudentRecord> {
        self.store.filter(&self.search)
    }

    pub async fn load(&mut self) -> Result<(), ApiError> {
        self.store.refresh(&self.backend, &self.notifier).await
    }

    pub async fn reload(&mut self) -> Result<(), ApiError> {
        self.search.clear();
        self.load().await
    }

    pub fn search(&mut self, term: &str) -> Vec<StudentRecord> {
        self.search = term.to_string();
        self.view()
    }

    pub async fn edit(&mut self, registration_code: &str) -> Result<(), ApiError> {
        self.controller
            .edit(registration_code, &self.backend, &self.notifier)
            .await
    }

    pub async fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        self.controller
            .submit(&self.backend, &mut self.store, &self.notifier)
            .await
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    /// Soft-deletes a student after confirmation. Independent of the form mode.
    pub async fn deactivate(
        &mut self,
        registration_code: &str,
        confirm: &dyn Confirm,
    ) -> Result<Deactivation, ApiError> {
        if !confirm.confirm(DEACTIVATE_PROMPT) {
            return Ok(Deactivation::Cancelled);
        }
        match self.backend.deactivate_student(registration_code).await {
            Ok(()) => {
                tracing::info!(ra = registration_code, "student deactivated");
                self.notifier.success(DEACTIVATED_MESSAGE);
                let _ = self.load().await;
                Ok(Deactivation::Done)
            }
            Err(e) => {
                tracing::warn!(ra = registration_code, error = %e, "deactivation failed");
                self.notifier.error(DEACTIVATE_FAILED_MESSAGE);
                Err(e)
            }
        }
    }

    pub async fn notices(&self) -> Result<Vec<BillingNotice>, ApiError> {
        notice::list_all(&self.backend, &self.notifier).await
    }

    pub async fn student_choices(&self) -> Result<Vec<(i64, String)>, ApiError> {
        match self.backend.list_students().await {
            Ok(records) => Ok(output::student_choices(&records)),
            Err(e) => {
                self.notifier.error(CHOICES_FAILED_MESSAGE);
                Err(e)
            }
        }
    }

    pub fn open_notice_dialog(&mut self, student_id: i64, monthly_fee: f64) -> &NoticeDraft {
        self.draft = NoticeDraft::open_for(student_id, monthly_fee);
        &self.draft
    }

    /// Same as [`Session::open_notice_dialog`], looking the student up in the snapshot.
    pub fn open_notice_dialog_for(&mut self, student_id: i64) -> Result<&NoticeDraft, NoticeError> {
        let fee = self
            .store
            .find_by_id(student_id)
            .map(|r| r.monthly_fee)
            .ok_or(NoticeError::MissingStudent)?;
        Ok(self.open_notice_dialog(student_id, fee))
    }

    pub fn close_notice_dialog(&mut self) {
        self.draft.close();
    }

    pub async fn submit_notice(&mut self) -> Result<NoticeCreated, CreateNoticeError> {
        notice::submit_draft(&mut self.draft, &self.backend, &self.notifier).await
    }
}
