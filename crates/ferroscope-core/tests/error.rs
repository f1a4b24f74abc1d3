//! Tests for error messages

use ferroscope_core::error::{HistoryError, ImageError, InspectError};
use ferroscope_core::types::{Address, TypeCategory};

#[test]
fn test_resolve_error_display()
{
    let error = InspectError::resolve("list.head", "No symbol \"list\" in current context.");
    let message = format!("{}", error);
    assert!(message.contains("list.head"));
    assert!(message.contains("No symbol"));
}

#[test]
fn test_deref_error_display()
{
    let error = InspectError::Deref(Address::new(0xdead));
    assert_eq!(error.to_string(), "cannot access memory at address 0xdead");
}

#[test]
fn test_type_mismatch_display()
{
    let error = InspectError::TypeMismatch {
        expected: TypeCategory::Pointer,
        found: TypeCategory::Struct,
    };
    let message = error.to_string();
    assert!(message.contains("pointer") || message.contains("Pointer"));
}

#[test]
fn test_invalid_step_ranges()
{
    let empty = HistoryError::InvalidStep { requested: 5, len: 0 };
    assert_eq!(empty.to_string(), "Invalid step. History has 0 steps (0--1)");

    let three = HistoryError::InvalidStep { requested: 3, len: 3 };
    assert_eq!(three.to_string(), "Invalid step. History has 3 steps (0-2)");
}

#[test]
fn test_image_error_from_io()
{
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
    let error: ImageError = io.into();
    match error {
        ImageError::Io(_) => {
            // Expected: io::Error converts to the Io variant
        }
        _ => panic!("Expected Io variant"),
    }
}

#[test]
fn test_image_error_from_json()
{
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: ImageError = json_err.into();
    assert!(error.to_string().starts_with("malformed heap image"));
}
