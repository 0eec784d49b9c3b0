pub mod report;

use serde::Serialize;

use crate::form::{FormMode, StudentForm};
use crate::model::{BillingNotice, StudentRecord};
use crate::notice::NoticeDraft;
use crate::utils;

pub const NO_STUDENTS_MESSAGE: &str = "No students found";
pub const NO_NOTICES_MESSAGE: &str = "No billing notices found";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" | "table" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

pub fn status_label(active: bool) -> &'static str {
    if active {
        "Active"
    } else {
        "Inactive"
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NoticeAction {
    pub student_id: i64,
    pub amount: String,
}

// actions offered on each row; edit and deactivate address the student by RA
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RowActions {
    pub edit: String,
    pub deactivate: String,
    pub generate_notice: NoticeAction,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StudentRow {
    pub id: i64,
    pub full_name: String,
    pub registration_code: String,
    pub email: String,
    pub monthly_fee: String,
    pub status: &'static str,
    pub active: bool,
    pub actions: RowActions,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NoticeRow {
    pub id: i64,
    pub barcode_line: String,
    pub amount: String,
    pub due_date: String,
}

pub fn student_rows(records: &[StudentRecord]) -> Vec<StudentRow> {
    records
        .iter()
        .map(|r| {
            let fee = utils::format_amount(r.monthly_fee);
            StudentRow {
                id: r.id,
                full_name: r.full_name.clone(),
                registration_code: r.registration_code.clone(),
                email: r.email.clone(),
                monthly_fee: fee.clone(),
                status: status_label(r.active),
                active: r.active,
                actions: RowActions {
                    edit: r.registration_code.clone(),
                    deactivate: r.registration_code.clone(),
                    generate_notice: NoticeAction {
                        student_id: r.id,
                        amount: fee,
                    },
                },
            }
        })
        .collect()
}

pub fn notice_rows(notices: &[BillingNotice]) -> Vec<NoticeRow> {
    notices
        .iter()
        .map(|n| NoticeRow {
            id: n.id,
            barcode_line: n.barcode_line.clone(),
            amount: utils::format_amount(n.amount),
            due_date: utils::format_date_br(n.due_date),
        })
        .collect()
}

pub fn student_choices(records: &[StudentRecord]) -> Vec<(i64, String)> {
    records
        .iter()
        .map(|r| (r.id, format!("{} (RA: {})", r.full_name, r.registration_code)))
        .collect()
}

fn render_table(headers: &[&str], rows: &[Vec<String>], placeholder: &str) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let mut out = String::new();
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            let pad = widths[i].saturating_sub(cell.chars().count());
            out.push_str(cell);
            if i + 1 < cells.len() {
                out.push_str(&" ".repeat(pad));
            }
        }
        out.push('\n');
        out
    };

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    out.push_str(&line(&header_cells));
    let total: usize = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    out.push_str(&"-".repeat(total));
    out.push('\n');
    if rows.is_empty() {
        out.push_str(placeholder);
        out.push('\n');
        return out;
    }
    for row in rows {
        out.push_str(&line(row));
    }
    out
}

pub fn render_students_text(rows: &[StudentRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.full_name.clone(),
                r.registration_code.clone(),
                r.email.clone(),
                format!("R$ {}", r.monthly_fee),
                r.status.to_string(),
            ]
        })
        .collect();
    render_table(
        &["ID", "Name", "RA", "Email", "Monthly fee", "Status"],
        &cells,
        NO_STUDENTS_MESSAGE,
    )
}

pub fn render_notices_text(rows: &[NoticeRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.barcode_line.clone(),
                format!("R$ {}", r.amount),
                r.due_date.clone(),
            ]
        })
        .collect();
    render_table(
        &["ID", "Barcode line", "Amount", "Due date"],
        &cells,
        NO_NOTICES_MESSAGE,
    )
}

pub fn render_form(mode: &FormMode, form: &StudentForm) -> String {
    let mut out = String::new();
    match mode {
        FormMode::Create => out.push_str(&format!("[{}]\n", mode.submit_label())),
        FormMode::Edit { registration_code } => out.push_str(&format!(
            "[{}] editing RA {registration_code}\n",
            mode.submit_label()
        )),
    }
    out.push_str(&format!("  name:   {}\n", form.full_name));
    out.push_str(&format!("  ra:     {}\n", form.registration_code));
    out.push_str(&format!("  email:  {}\n", form.email));
    out.push_str(&format!("  fee:    {}\n", form.monthly_fee));
    out.push_str(&format!("  active: {}\n", form.active));
    out
}

pub fn render_draft(draft: &NoticeDraft) -> String {
    if !draft.open {
        return "notice dialog closed\n".to_string();
    }
    let student = draft
        .student_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "[Generate Notice]\n  student: {student}\n  amount:  {}\n  due:     {}\n",
        draft.amount, draft.due_date
    )
}

pub fn render_json<T: Serialize>(rows: &[T]) -> String {
    let mut out = serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string());
    out.push('\n');
    out
}

pub fn render_students(records: &[StudentRecord], format: OutputFormat) -> String {
    let rows = student_rows(records);
    match format {
        OutputFormat::Text => render_students_text(&rows),
        OutputFormat::Json => render_json(&rows),
        OutputFormat::Html => report::render_students_page(&rows),
    }
}

pub fn render_notices(notices: &[BillingNotice], format: OutputFormat) -> String {
    let rows = notice_rows(notices);
    match format {
        OutputFormat::Text => render_notices_text(&rows),
        OutputFormat::Json => render_json(&rows),
        OutputFormat::Html => report::render_notices_page(&rows),
    }
}
