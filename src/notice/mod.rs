use thiserror::Error;

use crate::api::{ApiError, Backend};
use crate::model::{BillingNotice, NoticeRequest};
use crate::notify::{self, Notifier};
use crate::utils;

pub const NOTICE_CREATED_MESSAGE: &str = "Billing notice generated successfully!";
pub const NOTICES_LOAD_FAILED_MESSAGE: &str = "Failed to list billing notices.";

#[derive(Debug, Error, PartialEq)]
pub enum NoticeError {
    #[error("no student selected")]
    MissingStudent,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    #[error("invalid due date: {0}")]
    InvalidDueDate(String),
}

#[derive(Debug, Error)]
pub enum CreateNoticeError {
    #[error(transparent)]
    Invalid(#[from] NoticeError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoticeDraft {
    pub student_id: Option<i64>,
    pub amount: String,
    pub due_date: String,
    pub open: bool,
}

impl NoticeDraft {
    pub fn open_for(student_id: i64, monthly_fee: f64) -> Self {
        Self {
            student_id: Some(student_id),
            amount: utils::format_amount(monthly_fee),
            due_date: String::new(),
            open: true,
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.due_date.clear();
    }

    pub fn to_request(&self) -> Result<NoticeRequest, NoticeError> {
        let student_id = self.student_id.ok_or(NoticeError::MissingStudent)?;
        let amount = utils::parse_amount(&self.amount).map_err(NoticeError::InvalidAmount)?;
        if amount <= 0.0 {
            return Err(NoticeError::NonPositiveAmount);
        }
        let due_date =
            utils::parse_due_date(&self.due_date).map_err(NoticeError::InvalidDueDate)?;
        Ok(NoticeRequest {
            student_id,
            amount,
            due_date,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NoticeCreated {
    pub notice: BillingNotice,
    /// The listing fetched right after creation; `None` when that fetch failed.
    pub listing: Option<Vec<BillingNotice>>,
}

pub async fn list_all<B>(
    backend: &B,
    notifier: &dyn Notifier,
) -> Result<Vec<BillingNotice>, ApiError>
where
    B: Backend + ?Sized,
{
    backend.list_notices().await.map_err(|e| {
        tracing::warn!(error = %e, "billing notice listing failed");
        notifier.error(NOTICES_LOAD_FAILED_MESSAGE);
        e
    })
}

pub async fn create<B>(
    backend: &B,
    request: &NoticeRequest,
    notifier: &dyn Notifier,
) -> Result<NoticeCreated, ApiError>
where
    B: Backend + ?Sized,
{
    match backend.create_notice(request).await {
        Ok(notice) => {
            tracing::info!(
                student_id = request.student_id,
                notice_id = notice.id,
                "billing notice created"
            );
            notifier.success(NOTICE_CREATED_MESSAGE);
            let listing = list_all(backend, notifier).await.ok();
            Ok(NoticeCreated { notice, listing })
        }
        Err(e) => {
            notifier.error(&notify::failure_message(&e));
            Err(e)
        }
    }
}

/// Validates the dialog, creates the notice and closes the dialog on success.
pub async fn submit_draft<B>(
    draft: &mut NoticeDraft,
    backend: &B,
    notifier: &dyn Notifier,
) -> Result<NoticeCreated, CreateNoticeError>
where
    B: Backend + ?Sized,
{
    let request = draft.to_request().map_err(|e| {
        notifier.error(&e.to_string());
        e
    })?;
    let created = create(backend, &request, notifier).await?;
    draft.close();
    Ok(created)
}
