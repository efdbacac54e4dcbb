use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Draft, Entity};
use crate::errors::AppError;
use crate::forms::{round_cents, FieldSet};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JobTitle {
    pub id: Uuid,
    pub title: String,
    pub base_salary: f64,
    pub created_at: DateTime<Utc>,
}

impl JobTitle {
    /// Salary with a thousands separator, e.g. `$1.250.000` or `$50.000,5`.
    pub fn salary_display(&self) -> String {
        format_salary(self.base_salary)
    }
}

#[derive(Deserialize, Serialize, Validate, Debug, Clone, PartialEq)]
pub struct JobTitleDraft {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(range(min = 0.0))]
    pub base_salary: f64,
}

impl Draft for JobTitleDraft {
    fn from_fields(fields: &FieldSet) -> Result<Self, AppError> {
        JobTitleDraft {
            title: fields.require("title")?.to_string(),
            base_salary: fields.parse_decimal("base_salary")?,
        }
        .prepare()
    }

    fn normalize(self) -> Self {
        JobTitleDraft {
            title: self.title.trim().to_string(),
            base_salary: round_cents(self.base_salary),
        }
    }
}

impl Entity for JobTitle {
    type Draft = JobTitleDraft;

    const COLLECTION: &'static str = "cargos";
    const LABEL: &'static str = "Cargo";
    const EMPTY_MESSAGE: &'static str = "No hay cargos para mostrar. ¡Crea uno!";

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_draft(id: Uuid, created_at: DateTime<Utc>, draft: JobTitleDraft) -> Self {
        JobTitle {
            id,
            title: draft.title,
            base_salary: draft.base_salary,
            created_at,
        }
    }

    fn apply(&mut self, draft: JobTitleDraft) {
        self.title = draft.title;
        self.base_salary = draft.base_salary;
    }

    // Alphabetical, ignoring case and accents; exact text breaks ties.
    fn list_order(a: &Self, b: &Self) -> Ordering {
        title_key(&a.title)
            .cmp(&title_key(&b.title))
            .then_with(|| a.title.cmp(&b.title))
    }

    fn form_fields(&self) -> FieldSet {
        FieldSet::from([
            ("title", self.title.clone()),
            ("base_salary", format!("{:.2}", self.base_salary)),
        ])
    }
}

fn title_key(title: &str) -> String {
    title
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

fn format_salary(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    match fraction {
        0 => format!("${}", grouped),
        f if f % 10 == 0 => format!("${},{}", grouped, f / 10),
        f => format!("${},{:02}", grouped, f),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(salary: &str) -> Result<JobTitleDraft, AppError> {
        JobTitleDraft::from_fields(&FieldSet::from([
            ("title", "Analyst".to_string()),
            ("base_salary", salary.to_string()),
        ]))
    }

    #[test]
    fn rounds_salary_to_two_decimals() {
        assert_eq!(draft("1234.567").unwrap().base_salary, 1234.57);
        assert_eq!(draft("50000").unwrap().base_salary, 50000.0);
    }

    #[test]
    fn rejects_nan_and_negative_salaries() {
        assert!(matches!(draft("NaN"), Err(AppError::Validation(_))));
        assert!(matches!(draft("abc"), Err(AppError::Validation(_))));
        assert!(matches!(draft("-1"), Err(AppError::Validation(_))));
    }

    #[test]
    fn json_drafts_are_trimmed_and_rounded() {
        let draft = JobTitleDraft { title: "  Analyst ".into(), base_salary: 1.239 }
            .prepare()
            .unwrap();
        assert_eq!(draft.title, "Analyst");
        assert_eq!(draft.base_salary, 1.24);

        let blank = JobTitleDraft { title: "   ".into(), base_salary: 1.0 };
        assert!(matches!(blank.prepare(), Err(AppError::Validation(_))));
    }

    fn job_title(title: &str) -> JobTitle {
        JobTitle {
            id: Uuid::new_v4(),
            title: title.to_string(),
            base_salary: 1.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn orders_titles_ignoring_case_and_accents() {
        let mut titles: Vec<_> = ["analista", "Bodeguero", "Tesorero", "Técnico", "Álvaro"]
            .into_iter()
            .map(job_title)
            .collect();
        titles.sort_by(JobTitle::list_order);
        let order: Vec<_> = titles.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(order, ["Álvaro", "analista", "Bodeguero", "Técnico", "Tesorero"]);
    }

    #[test]
    fn formats_salary_with_thousands_separator() {
        assert_eq!(format_salary(1_250_000.0), "$1.250.000");
        assert_eq!(format_salary(50_000.5), "$50.000,5");
        assert_eq!(format_salary(999.25), "$999,25");
        assert_eq!(format_salary(0.0), "$0");
    }
}
