use serde::{Deserialize, Serialize};

use super::repo_types::Order;

/// Every field is optional on the wire so that a missing field becomes a
/// validation error instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct OrderRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub problem_statement: Option<String>,
    pub leading_channel: Option<String>,
    pub project_type: Option<String>,
    pub preferred_software: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderCreated {
    pub message: &'static str,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderDeleted {
    pub message: &'static str,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderList {
    pub data: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct OrderEnvelope {
    pub data: Order,
}
