use validator::{Validate, ValidationErrors};

use crate::errors::AppError;

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(map_validation_error)
}

pub fn map_validation_error(err: ValidationErrors) -> AppError {
    let mut details = err
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let errors = errs
                .iter()
                .map(|e| match e.message.as_deref() {
                    Some(message) => format!("{}: {}", e.code, message),
                    None => e.code.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: [{}]", field, errors)
        })
        .collect::<Vec<_>>();
    details.sort();
    AppError::Validation(format!("Validation failed: {}", details.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1))]
        name: String,
        #[validate(range(min = 1, max = 120))]
        age: i32,
    }

    #[test]
    fn lists_every_failing_field() {
        let err = validate_payload(&Payload { name: String::new(), age: 0 }).unwrap_err();
        assert_eq!(
            err,
            AppError::Validation("Validation failed: age: [range]; name: [length]".to_string())
        );
    }

    #[test]
    fn passes_valid_payloads() {
        assert!(validate_payload(&Payload { name: "Ana".into(), age: 30 }).is_ok());
    }
}
