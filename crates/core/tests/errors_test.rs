use std::error::Error;
use studio_core::errors::{StudioError, StudioResult};

#[test]
fn test_studio_error_display() {
    let not_found = StudioError::NotFound("Booking not found".to_string());
    let validation = StudioError::Validation("Booking name required.".to_string());
    let conflict = StudioError::Conflict("Category is not empty".to_string());
    let authentication = StudioError::Authentication("Invalid password".to_string());
    let authorization = StudioError::Authorization("Not authorized".to_string());
    let storage = StudioError::Storage("Bucket unreachable".to_string());
    let database = StudioError::Database(eyre::eyre!("Database connection failed"));
    let internal = StudioError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Internal error",
    )));

    assert_eq!(
        not_found.to_string(),
        "Resource not found: Booking not found"
    );
    assert_eq!(
        validation.to_string(),
        "Validation error: Booking name required."
    );
    assert_eq!(conflict.to_string(), "Conflict: Category is not empty");
    assert_eq!(
        authentication.to_string(),
        "Authentication error: Invalid password"
    );
    assert_eq!(
        authorization.to_string(),
        "Authorization error: Not authorized"
    );
    assert_eq!(storage.to_string(), "Storage error: Bucket unreachable");
    assert!(database.to_string().contains("Database error:"));
    assert!(internal.to_string().contains("Internal server error:"));
}

#[test]
fn test_internal_constructor_keeps_source() {
    let io_error = std::io::Error::new(std::io::ErrorKind::Other, "IO error");
    let studio_error = StudioError::internal(io_error);

    assert!(studio_error.source().is_some());
    assert!(studio_error.to_string().contains("IO error"));
}

#[test]
fn test_studio_result() {
    let result: StudioResult<i32> = Ok(42);
    assert_eq!(result.unwrap(), 42);

    let result: StudioResult<i32> = Err(StudioError::NotFound("Not found".to_string()));
    assert!(result.is_err());
}

#[test]
fn test_from_eyre_report() {
    let studio_error: StudioError = eyre::eyre!("Database error").into();

    assert!(matches!(studio_error, StudioError::Database(_)));
}

#[test]
fn test_studio_error_survives_eyre_round_trip() {
    let report: eyre::Report = StudioError::Validation("bad".to_string()).into();

    assert!(matches!(
        report.downcast_ref::<StudioError>(),
        Some(StudioError::Validation(_))
    ));
}
