//! Typed domain errors and the node-name decision tree.
//!
//! All error types implement `thiserror::Error` and convert to
//! `anyhow::Error` via the `?` operator.

use thiserror::Error;

/// Errors from node-name validation and target resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeError {
    #[error("no active nodes")]
    NoActiveNodes,

    #[error("more than one running node found; select one with -n")]
    NameRequired,

    #[error("unknown node '{0}'")]
    UnknownNode(String),

    #[error("invalid node name '{0}': must match ^[a-z0-9][a-z0-9-]*$ (max 40 chars)")]
    InvalidName(String),

    #[error("'{0}': name already in use")]
    NameTaken(String),
}

/// Errors from bridge action/component combinations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("component name required for single-component actions")]
    ComponentRequired,

    #[error("whole-bridge actions operate on 'all'; use a *-single action for one component")]
    ComponentNotAllowed,
}

/// Pick the node an operation targets.
///
/// - zero active nodes is always an error;
/// - an explicit name must belong to an active node;
/// - with exactly one active node the name is inferred;
/// - with several active nodes a name is required.
///
/// # Errors
///
/// Returns a [`NodeError`] describing which rule failed.
pub fn resolve_target(active: &[String], requested: Option<&str>) -> Result<String, NodeError> {
    if active.is_empty() {
        return Err(NodeError::NoActiveNodes);
    }
    match requested {
        Some(name) => {
            if active.iter().any(|n| n == name) {
                Ok(name.to_string())
            } else {
                Err(NodeError::UnknownNode(name.to_string()))
            }
        }
        None => {
            if let [single] = active {
                Ok(single.clone())
            } else {
                Err(NodeError::NameRequired)
            }
        }
    }
}

/// Validate a user-supplied node name.
///
/// # Errors
///
/// Returns [`NodeError::InvalidName`] when the name is empty, too long,
/// or contains characters outside `[a-z0-9-]`.
pub fn validate_name(name: &str) -> Result<(), NodeError> {
    let valid = !name.is_empty()
        && name.len() <= 40
        && name.chars().next().is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(NodeError::InvalidName(name.to_string()))
    }
}
