use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// a student as returned by the `/alunos` endpoints
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StudentRecord {
    pub id: i64,
    #[serde(rename = "nomeCompleto")]
    pub full_name: String,
    #[serde(rename = "ra")]
    pub registration_code: String,
    pub email: String,
    #[serde(rename = "mensalidade")]
    pub monthly_fee: f64,
    #[serde(rename = "ativo")]
    pub active: bool,
}

impl StudentRecord {
    pub fn to_payload(&self) -> StudentPayload {
        StudentPayload {
            full_name: self.full_name.clone(),
            registration_code: self.registration_code.clone(),
            email: self.email.clone(),
            monthly_fee: self.monthly_fee,
            active: self.active,
        }
    }
}

// the body sent on create/update; the server assigns the id
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StudentPayload {
    #[serde(rename = "nomeCompleto")]
    pub full_name: String,
    #[serde(rename = "ra")]
    pub registration_code: String,
    pub email: String,
    #[serde(rename = "mensalidade")]
    pub monthly_fee: f64,
    #[serde(rename = "ativo")]
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct BillingNotice {
    pub id: i64,
    #[serde(rename = "linhaDigitavel")]
    pub barcode_line: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "vencimento")]
    pub due_date: NaiveDate,
}

// the parameters of `POST /cobrancas`, sent as a query string
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NoticeRequest {
    #[serde(rename = "alunoId")]
    pub student_id: i64,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "vencimento", with = "plain_date")]
    pub due_date: NaiveDate,
}

mod plain_date {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_record_uses_wire_names() {
        let raw = r#"{"id":3,"nomeCompleto":"Ana Silva","ra":"A1","email":"ana@x.io","mensalidade":150.0,"ativo":true}"#;
        let rec: StudentRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(rec.registration_code, "A1");
        assert_eq!(rec.full_name, "Ana Silva");
        assert!(rec.active);

        let payload = serde_json::to_value(rec.to_payload()).unwrap();
        assert!(payload.get("id").is_none());
        assert_eq!(payload["nomeCompleto"], "Ana Silva");
        assert_eq!(payload["mensalidade"], 150.0);
    }

    #[test]
    fn billing_notice_parses_plain_date() {
        let raw = r#"{"id":1,"linhaDigitavel":"2379 0000","valor":99.9,"vencimento":"2025-01-10"}"#;
        let notice: BillingNotice = serde_json::from_str(raw).unwrap();
        assert_eq!(notice.due_date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
    }
}
