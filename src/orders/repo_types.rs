use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub problem_statement: String,
    pub leading_channel: String,
    pub project_type: String,
    pub preferred_software: String,
    pub description: String,
    pub done: bool,
    pub paid: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Order {
    pub fn toggle_done(&mut self) {
        self.done = !self.done;
    }

    pub fn toggle_paid(&mut self) {
        self.paid = !self.paid;
    }
}

/// Validated insert payload; status flags start out false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub problem_statement: String,
    pub leading_channel: String,
    pub project_type: String,
    pub preferred_software: String,
    pub description: String,
}
