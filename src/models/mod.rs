// src/models/mod.rs

pub mod admin;
pub mod directory;
pub mod quote;
pub mod user;
pub mod user_desc;

use validator::ValidationErrors;

/// Flattens validation failures into one line for a flash message.
/// Fields are reported in name order so the text is stable.
pub fn describe_validation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("Invalid {}.", field.replace('_', " ")),
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
