use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::api::{ApiError, Backend};
use crate::model::{BillingNotice, NoticeRequest, StudentPayload, StudentRecord};
use crate::notify::Notifier;

pub fn student(id: i64, ra: &str, name: &str, fee: f64, active: bool) -> StudentRecord {
    StudentRecord {
        id,
        full_name: name.to_string(),
        registration_code: ra.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        monthly_fee: fee,
        active,
    }
}

fn transport_error() -> ApiError {
    let source = reqwest::Client::new()
        .get("http://")
        .build()
        .expect_err("empty host must not build");
    ApiError::Transport { source }
}

#[derive(Default)]
struct FakeState {
    students: Vec<StudentRecord>,
    notices: Vec<BillingNotice>,
    reject: Option<(u16, String)>,
    reject_listing: Option<(u16, String)>,
    transport_down: bool,
    list_calls: usize,
    notice_list_calls: usize,
    notice_requests: Vec<NoticeRequest>,
    deactivated: Vec<String>,
}

/// In-memory server. `reject_with` makes every write answer with that status
/// and body, `reject_listing_with` does the same for the student listing, and
/// `fail_transport` makes every call fail before a response.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn with_students(students: Vec<StudentRecord>) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().students = students;
        backend
    }

    pub fn students(&self) -> Vec<StudentRecord> {
        self.state.lock().unwrap().students.clone()
    }

    pub fn fail_transport(&self, down: bool) {
        self.state.lock().unwrap().transport_down = down;
    }

    pub fn reject_with(&self, status: u16, body: &str) {
        self.state.lock().unwrap().reject = Some((status, body.to_string()));
    }

    pub fn reject_listing_with(&self, status: u16, body: &str) {
        self.state.lock().unwrap().reject_listing = Some((status, body.to_string()));
    }

    pub fn accept(&self) {
        let mut state = self.state.lock().unwrap();
        state.reject = None;
        state.reject_listing = None;
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn notice_list_calls(&self) -> usize {
        self.state.lock().unwrap().notice_list_calls
    }

    pub fn notice_requests(&self) -> Vec<NoticeRequest> {
        self.state.lock().unwrap().notice_requests.clone()
    }

    pub fn deactivated(&self) -> Vec<String> {
        self.state.lock().unwrap().deactivated.clone()
    }

    fn check_read(&self) -> Result<(), ApiError> {
        if self.state.lock().unwrap().transport_down {
            return Err(transport_error());
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), ApiError> {
        self.check_read()?;
        if let Some((status, body)) = self.state.lock().unwrap().reject.clone() {
            return Err(ApiError::Status { status, body });
        }
        Ok(())
    }
}

fn not_found(ra: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        body: format!("Aluno com RA {ra} não encontrado"),
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_students(&self) -> Result<Vec<StudentRecord>, ApiError> {
        self.check_read()?;
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if let Some((status, body)) = state.reject_listing.clone() {
            return Err(ApiError::Status { status, body });
        }
        Ok(state.students.clone())
    }

    async fn get_student(&self, registration_code: &str) -> Result<StudentRecord, ApiError> {
        self.check_read()?;
        let state = self.state.lock().unwrap();
        state
            .students
            .iter()
            .find(|s| s.registration_code == registration_code)
            .cloned()
            .ok_or_else(|| not_found(registration_code))
    }

    async fn create_student(&self, payload: &StudentPayload) -> Result<(), ApiError> {
        self.check_write()?;
        let mut state = self.state.lock().unwrap();
        let id = state.students.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        state.students.push(StudentRecord {
            id,
            full_name: payload.full_name.clone(),
            registration_code: payload.registration_code.clone(),
            email: payload.email.clone(),
            monthly_fee: payload.monthly_fee,
            active: payload.active,
        });
        Ok(())
    }

    async fn update_student(
        &self,
        registration_code: &str,
        payload: &StudentPayload,
    ) -> Result<(), ApiError> {
        self.check_write()?;
        let mut state = self.state.lock().unwrap();
        let record = state
            .students
            .iter_mut()
            .find(|s| s.registration_code == registration_code)
            .ok_or_else(|| not_found(registration_code))?;
        record.full_name = payload.full_name.clone();
        record.registration_code = payload.registration_code.clone();
        record.email = payload.email.clone();
        record.monthly_fee = payload.monthly_fee;
        record.active = payload.active;
        Ok(())
    }

    async fn deactivate_student(&self, registration_code: &str) -> Result<(), ApiError> {
        self.check_write()?;
        let mut state = self.state.lock().unwrap();
        let record = state
            .students
            .iter_mut()
            .find(|s| s.registration_code == registration_code)
            .ok_or_else(|| not_found(registration_code))?;
        record.active = false;
        state.deactivated.push(registration_code.to_string());
        Ok(())
    }

    async fn list_notices(&self) -> Result<Vec<BillingNotice>, ApiError> {
        self.check_read()?;
        let mut state = self.state.lock().unwrap();
        state.notice_list_calls += 1;
        Ok(state.notices.clone())
    }

    async fn create_notice(&self, request: &NoticeRequest) -> Result<BillingNotice, ApiError> {
        self.check_write()?;
        let mut state = self.state.lock().unwrap();
        state.notice_requests.push(request.clone());
        let id = state.notices.len() as i64 + 1;
        let notice = BillingNotice {
            id,
            barcode_line: format!("23790.00000 {:05}.{:06}", request.student_id, id),
            amount: request.amount,
            due_date: request.due_date,
        };
        state.notices.push(notice.clone());
        Ok(notice)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

#[test]
fn silva_and_digit_two_scenario() {
    let snapshot = vec![
        student(1, "A1", "Ana Silva", 150.0, true),
        student(2, "B2", "Bruno", 200.0, false),
    ];
    let silva = crate::store::filter_records(&snapshot, "silva");
    assert_eq!(silva, vec![snapshot[0].clone()]);

    let two = crate::store::filter_records(&snapshot, "2");
    assert_eq!(two, vec![snapshot[1].clone()]);
}

#[test]
fn zero_snapshot_renders_one_placeholder_row() {
    let store = crate::store::RecordStore::new();
    let body = crate::output::report::render_student_body(&crate::output::student_rows(store.get()));
    assert_eq!(body.matches("<tr>").count(), 1);
    assert!(body.contains(crate::output::NO_STUDENTS_MESSAGE));
}

#[tokio::test]
async fn create_notice_for_student_seven() {
    let backend = FakeBackend::default();
    let notifier = RecordingNotifier::default();
    let request = NoticeRequest {
        student_id: 7,
        amount: 99.90,
        due_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
    };

    let created = crate::notice::create(&backend, &request, &notifier)
        .await
        .unwrap();
    let json = serde_json::to_value(&created.notice).unwrap();
    assert_eq!(json["valor"], 99.9);
    assert_eq!(json["vencimento"], "2025-01-10");
    assert_eq!(backend.notice_list_calls(), 1);
}

#[tokio::test]
async fn refresh_discards_prior_contents() {
    let backend = FakeBackend::with_students(vec![student(5, "E5", "Eva", 10.0, true)]);
    let notifier = RecordingNotifier::default();
    let mut store = crate::store::RecordStore::new();
    store.replace(vec![
        student(1, "A1", "Ana", 1.0, true),
        student(2, "B2", "Bruno", 2.0, true),
    ]);
    store.refresh(&backend, &notifier).await.unwrap();
    assert_eq!(store.get(), backend.students().as_slice());
}
