use super::{NoticeRow, StudentRow, NO_NOTICES_MESSAGE, NO_STUDENTS_MESSAGE};

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn placeholder_row(colspan: usize, message: &str) -> String {
    format!("<tr><td colspan=\"{colspan}\" class=\"text-center\">{message}</td></tr>\n")
}

pub fn render_student_body(rows: &[StudentRow]) -> String {
    if rows.is_empty() {
        return placeholder_row(7, NO_STUDENTS_MESSAGE);
    }
    let mut out = String::new();
    for r in rows {
        let status_class = if r.active {
            "text-success fw-bold"
        } else {
            "text-danger fw-bold"
        };
        let ra = escape_html(&r.actions.edit);
        out.push_str("<tr>\n");
        out.push_str(&format!("  <td>{}</td>\n", r.id));
        out.push_str(&format!("  <td>{}</td>\n", escape_html(&r.full_name)));
        out.push_str(&format!("  <td>{}</td>\n", escape_html(&r.registration_code)));
        out.push_str(&format!("  <td>{}</td>\n", escape_html(&r.email)));
        out.push_str(&format!("  <td>R$ {}</td>\n", r.monthly_fee));
        out.push_str(&format!(
            "  <td><span class=\"{status_class}\">{}</span></td>\n",
            r.status
        ));
        out.push_str("  <td>\n");
        out.push_str(&format!(
            "    <button class=\"btn btn-sm btn-warning\" data-action=\"edit\" data-ra=\"{ra}\">Edit</button>\n"
        ));
        out.push_str(&format!(
            "    <button class=\"btn btn-sm btn-danger\" data-action=\"deactivate\" data-ra=\"{}\">Deactivate</button>\n",
            escape_html(&r.actions.deactivate)
        ));
        out.push_str(&format!(
            "    <button class=\"btn btn-sm btn-info\" data-action=\"notice\" data-student-id=\"{}\" data-amount=\"{}\">Generate Notice</button>\n",
            r.actions.generate_notice.student_id, r.actions.generate_notice.amount
        ));
        out.push_str("  </td>\n");
        out.push_str("</tr>\n");
    }
    out
}

pub fn render_notice_body(rows: &[NoticeRow]) -> String {
    if rows.is_empty() {
        return placeholder_row(4, NO_NOTICES_MESSAGE);
    }
    let mut out = String::new();
    for r in rows {
        out.push_str("<tr>\n");
        out.push_str(&format!("  <td>{}</td>\n", r.id));
        out.push_str(&format!("  <td>{}</td>\n", escape_html(&r.barcode_line)));
        out.push_str(&format!("  <td>R$ {}</td>\n", r.amount));
        out.push_str(&format!("  <td>{}</td>\n", r.due_date));
        out.push_str("</tr>\n");
    }
    out
}

fn page(title: &str, headers: &[&str], body: &str) -> String {
    let head: String = headers
        .iter()
        .map(|h| format!("          <th>{h}</th>\n"))
        .collect();
    format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{title}</title>
  <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet"/>
</head>
<body class="container py-4">
  <h1 class="mb-4">{title}</h1>
  <table class="table table-striped">
    <thead>
        <tr>
{head}        </tr>
    </thead>
    <tbody>
{body}    </tbody>
  </table>
</body>
</html>
"####
    )
}

pub fn render_students_page(rows: &[StudentRow]) -> String {
    page(
        "Students",
        &["ID", "Name", "RA", "Email", "Monthly fee", "Status", "Actions"],
        &render_student_body(rows),
    )
}

pub fn render_notices_page(rows: &[NoticeRow]) -> String {
    page(
        "Billing Notices",
        &["ID", "Barcode line", "Amount", "Due date"],
        &render_notice_body(rows),
    )
}
