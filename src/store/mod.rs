use crate::api::{ApiError, Backend};
use crate::model::StudentRecord;
use crate::notify::Notifier;
use crate::utils;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load the student list!";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    snapshot: Vec<StudentRecord>,
    issued: u64,
    applied: u64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &[StudentRecord] {
        &self.snapshot
    }

    pub fn replace(&mut self, snapshot: Vec<StudentRecord>) {
        self.snapshot = snapshot;
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn find_by_id(&self, id: i64) -> Option<&StudentRecord> {
        self.snapshot.iter().find(|r| r.id == id)
    }

    pub fn filter(&self, term: &str) -> Vec<StudentRecord> {
        filter_records(&self.snapshot, term)
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Applies a listing fetched under `ticket`. Returns false when a newer
    /// listing was already applied and this one was discarded.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        snapshot: Vec<StudentRecord>,
    ) -> bool {
        if ticket.0 <= self.applied {
            tracing::debug!(
                ticket = ticket.0,
                applied = self.applied,
                "discarding stale student listing"
            );
            return false;
        }
        self.applied = ticket.0;
        self.replace(snapshot);
        true
    }

    pub async fn refresh<B>(&mut self, backend: &B, notifier: &dyn Notifier) -> Result<(), ApiError>
    where
        B: Backend + ?Sized,
    {
        let ticket = self.begin_refresh();
        match backend.list_students().await {
            Ok(records) => {
                tracing::info!(count = records.len(), "student listing refreshed");
                self.complete_refresh(ticket, records);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "student listing failed");
                notifier.error(LOAD_FAILED_MESSAGE);
                Err(e)
            }
        }
    }
}

pub fn filter_records(records: &[StudentRecord], term: &str) -> Vec<StudentRecord> {
    if term.is_empty() {
        return records.to_vec();
    }
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|r| record_matches(r, &needle))
        .cloned()
        .collect()
}

fn record_matches(record: &StudentRecord, needle: &str) -> bool {
    record.full_name.to_lowercase().contains(needle)
        || record.registration_code.to_lowercase().contains(needle)
        || record.email.to_lowercase().contains(needle)
        || utils::format_amount(record.monthly_fee).contains(needle)
}
