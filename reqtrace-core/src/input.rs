//! Parsing of raw form/command-line input into typed values
//!
//! Every parser fails closed: anything that is not clearly valid becomes a
//! `ValidationError` and never reaches the store.

use crate::error::ValidationError;
use crate::models::{RequirementPriority, RequirementStatus};

/// Parses a priority selection ("High", "medium", ...)
pub fn parse_priority(s: &str) -> Result<RequirementPriority, ValidationError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("priority"));
    }

    match trimmed.to_lowercase().as_str() {
        "high" => Ok(RequirementPriority::High),
        "medium" => Ok(RequirementPriority::Medium),
        "low" => Ok(RequirementPriority::Low),
        _ => Err(ValidationError::InvalidValue {
            field: "priority",
            value: trimmed.to_string(),
        }),
    }
}

/// Parses a status selection ("Pending", "In Progress", "in-progress", ...)
pub fn parse_status(s: &str) -> Result<RequirementStatus, ValidationError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("status"));
    }

    match trimmed.to_lowercase().as_str() {
        "pending" => Ok(RequirementStatus::Pending),
        "in progress" | "in-progress" | "in_progress" | "inprogress" => {
            Ok(RequirementStatus::InProgress)
        }
        "completed" => Ok(RequirementStatus::Completed),
        _ => Err(ValidationError::InvalidValue {
            field: "status",
            value: trimmed.to_string(),
        }),
    }
}

/// Parses a single requirement id
pub fn parse_requirement_id(s: &str) -> Result<i64, ValidationError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("requirement id"));
    }

    match trimmed.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidId(trimmed.to_string())),
    }
}

/// Parses a comma-separated list of traced requirement ids
///
/// Order is preserved and repeated ids are kept, so a duplicate inside one
/// batch still reaches the store and rolls the batch back there.
pub fn parse_target_ids(s: &str) -> Result<Vec<i64>, ValidationError> {
    if s.trim().is_empty() {
        return Err(ValidationError::EmptyTargetList);
    }

    s.split(',').map(parse_requirement_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_priority() {
        assert_eq!(parse_priority("High").unwrap(), RequirementPriority::High);
        assert_eq!(parse_priority(" low ").unwrap(), RequirementPriority::Low);
        assert_eq!(
            parse_priority(""),
            Err(ValidationError::MissingField("priority"))
        );
        assert!(matches!(
            parse_priority("Urgent"),
            Err(ValidationError::InvalidValue { field: "priority", .. })
        ));
    }

    #[test]
    fn test_parse_status_variants() {
        for input in ["In Progress", "in-progress", "IN_PROGRESS", "inprogress"] {
            assert_eq!(parse_status(input).unwrap(), RequirementStatus::InProgress);
        }
        assert_eq!(parse_status("completed").unwrap(), RequirementStatus::Completed);
        assert_eq!(parse_status("  "), Err(ValidationError::MissingField("status")));
        assert!(parse_status("Done").is_err());
    }

    #[test]
    fn test_parse_requirement_id() {
        assert_eq!(parse_requirement_id(" 42 ").unwrap(), 42);
        assert_eq!(
            parse_requirement_id("0"),
            Err(ValidationError::InvalidId("0".to_string()))
        );
        assert_eq!(
            parse_requirement_id("abc"),
            Err(ValidationError::InvalidId("abc".to_string()))
        );
    }

    #[test]
    fn test_parse_target_ids_keeps_order_and_duplicates() {
        assert_eq!(parse_target_ids("3, 1,3").unwrap(), vec![3, 1, 3]);
        assert_eq!(parse_target_ids("7").unwrap(), vec![7]);
    }

    #[test]
    fn test_parse_target_ids_fails_closed() {
        assert_eq!(parse_target_ids(""), Err(ValidationError::EmptyTargetList));
        assert_eq!(
            parse_target_ids("1,,2"),
            Err(ValidationError::MissingField("requirement id"))
        );
        assert_eq!(
            parse_target_ids("1,x"),
            Err(ValidationError::InvalidId("x".to_string()))
        );
        assert!(parse_target_ids("1,2,").is_err());
    }
}
