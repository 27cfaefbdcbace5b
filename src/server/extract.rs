//! Request extraction with schema and field validation
//!
//! [`ValidatedJson`] wraps axum's JSON extractor and separates the two
//! failure classes the HTTP contract distinguishes: a body that does not
//! parse as the expected shape is a 422 (`InvalidPayload`), while a body
//! that parses but carries bad values is a 400 (`Validation`) with
//! field-level detail.

use crate::core::error::{FieldValidationError, ShiplineError};
use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// JSON body extractor that runs `validator` rules after deserialization.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ShiplineError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rej| {
            ShiplineError::InvalidPayload {
                message: rej.body_text(),
            }
        })?;
        value
            .validate()
            .map_err(|errors| ShiplineError::Validation(flatten_errors("", &errors)))?;
        Ok(Self(value))
    }
}

/// Flatten nested `ValidationErrors` into dotted/indexed field paths like
/// `items[0].quantity`.
fn flatten_errors(prefix: &str, errors: &ValidationErrors) -> Vec<FieldValidationError> {
    let mut out = Vec::new();
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed {} validation", err.code));
                    out.push(FieldValidationError {
                        field: path.clone(),
                        message,
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                out.extend(flatten_errors(&path, nested));
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    out.extend(flatten_errors(&format!("{path}[{index}]"), nested));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Inner {
        #[validate(range(min = 1, message = "must be at least 1"))]
        quantity: i64,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Outer {
        #[validate(length(min = 1, message = "must not be empty"))]
        name: String,
        #[validate(nested)]
        items: Vec<Inner>,
    }

    #[test]
    fn test_flatten_reports_nested_list_paths() {
        let value = Outer {
            name: String::new(),
            items: vec![Inner { quantity: 1 }, Inner { quantity: 0 }],
        };
        let errors = value.validate().unwrap_err();
        let flat = flatten_errors("", &errors);
        let fields: Vec<&str> = flat.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"items[1].quantity"));
        assert!(!fields.iter().any(|f| f.starts_with("items[0]")));
    }

    #[test]
    fn test_flatten_keeps_custom_messages() {
        let value = Outer {
            name: String::new(),
            items: vec![],
        };
        let flat = flatten_errors("", &value.validate().unwrap_err());
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].message, "must not be empty");
    }
}
