use super::{dto::OrderRequest, repo_types::NewOrder};
use crate::{auth::services::is_valid_email, error::AppError};

// Column widths in migrations/0001_init.sql, counted in characters.
const MAX_FIELD_LEN: usize = 250;
const MAX_SOFTWARE_LEN: usize = 500;

fn required(field: Option<String>) -> Option<String> {
    field.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// All fields must be present and non-blank, and the contact email must look
/// like an address.
pub fn validate_order(req: OrderRequest) -> Result<NewOrder, AppError> {
    let missing = || AppError::Validation("Please enter all fields".into());

    let order = NewOrder {
        name: required(req.name).ok_or_else(missing)?,
        email: required(req.email).ok_or_else(missing)?,
        phone_number: required(req.phone_number).ok_or_else(missing)?,
        problem_statement: required(req.problem_statement).ok_or_else(missing)?,
        leading_channel: required(req.leading_channel).ok_or_else(missing)?,
        project_type: required(req.project_type).ok_or_else(missing)?,
        preferred_software: required(req.preferred_software).ok_or_else(missing)?,
        description: required(req.description).ok_or_else(missing)?,
    };

    let capped = [
        ("name", &order.name, MAX_FIELD_LEN),
        ("email", &order.email, MAX_FIELD_LEN),
        ("phone_number", &order.phone_number, MAX_FIELD_LEN),
        ("problem_statement", &order.problem_statement, MAX_FIELD_LEN),
        ("leading_channel", &order.leading_channel, MAX_FIELD_LEN),
        ("project_type", &order.project_type, MAX_FIELD_LEN),
        ("preferred_software", &order.preferred_software, MAX_SOFTWARE_LEN),
    ];
    for (field, value, max) in capped {
        if value.chars().count() > max {
            return Err(AppError::Validation(format!(
                "{field} must be at most {max} characters"
            )));
        }
    }

    if !is_valid_email(&order.email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    Ok(order)
}
