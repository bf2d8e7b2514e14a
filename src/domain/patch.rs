//! Partial updates as ordered field-level operations.
//!
//! A [`PatchDocument`] is a list of RFC 6902-shaped operations over a flat
//! record. [`apply_patch`] runs them in order against a copy of the target,
//! validates the result and hands it back only if everything succeeded, so
//! the caller either commits the whole patch or nothing.

use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::FieldErrors;

/// A single failed operation, attributed to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchError {
    pub field: String,
    pub message: String,
}

impl PatchError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unknown_path(path: &str) -> Self {
        Self::new(path, format!("The target location specified by path '/{}' was not found.", path))
    }
}

/// Records that can be patched field by field.
///
/// `path` is a single field name taken from the JSON pointer, without the
/// leading slash. Implementations decide how names are matched.
pub trait Patchable: Clone {
    fn read(&self, path: &str) -> Result<Value, PatchError>;

    fn write(&mut self, path: &str, value: Value) -> Result<(), PatchError>;
}

/// One patch operation.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add {
        path: String,
        #[schema(value_type = Object)]
        value: Value,
    },
    Replace {
        path: String,
        #[schema(value_type = Object)]
        value: Value,
    },
    Remove {
        path: String,
    },
    Copy {
        from: String,
        path: String,
    },
    Move {
        from: String,
        path: String,
    },
    Test {
        path: String,
        #[schema(value_type = Object)]
        value: Value,
    },
}

impl PatchOperation {
    fn apply<T: Patchable>(&self, target: &mut T) -> Result<(), PatchError> {
        match self {
            PatchOperation::Add { path, value } | PatchOperation::Replace { path, value } => {
                target.write(field_of(path)?, value.clone())
            }
            PatchOperation::Remove { path } => target.write(field_of(path)?, Value::Null),
            PatchOperation::Copy { from, path } => {
                let value = target.read(field_of(from)?)?;
                target.write(field_of(path)?, value)
            }
            PatchOperation::Move { from, path } => {
                let (from, path) = (field_of(from)?, field_of(path)?);
                let value = target.read(from)?;
                if from.eq_ignore_ascii_case(path) {
                    return Ok(());
                }
                target.write(path, value)?;
                target.write(from, Value::Null)
            }
            PatchOperation::Test { path, value } => {
                let field = field_of(path)?;
                let current = target.read(field)?;
                if &current == value {
                    Ok(())
                } else {
                    Err(PatchError::new(
                        field,
                        format!(
                            "The current value '{}' at path '{}' is not equal to the test value '{}'.",
                            current, path, value
                        ),
                    ))
                }
            }
        }
    }
}

/// Ordered list of patch operations, as sent in a PATCH body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PatchDocument(pub Vec<PatchOperation>);

impl PatchDocument {
    pub fn operations(&self) -> &[PatchOperation] {
        &self.0
    }
}

/// Single-segment JSON pointer to field name: `/firstName` -> `firstName`.
fn field_of(pointer: &str) -> Result<&str, PatchError> {
    match pointer.strip_prefix('/') {
        Some(field) if !field.is_empty() && !field.contains('/') => Ok(field),
        _ => Err(PatchError::new(
            pointer.trim_start_matches('/'),
            format!("The path '{}' is not a valid field path.", pointer),
        )),
    }
}

/// Apply `document` to a copy of `target`, then validate the copy.
///
/// Every failing operation is recorded; any failure, or a constraint
/// violation in the patched copy, rejects the document as a whole.
pub fn apply_patch<T>(target: &T, document: &PatchDocument) -> Result<T, FieldErrors>
where
    T: Patchable + Validate,
{
    let mut patched = target.clone();
    let mut errors = FieldErrors::new();

    for operation in document.operations() {
        if let Err(e) = operation.apply(&mut patched) {
            errors.add(e.field, e.message);
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    patched.validate().map_err(FieldErrors::from)?;
    Ok(patched)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::User;

    fn user() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            password: "p1".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
            api_key: "key-1".to_string(),
        }
    }

    fn document(value: serde_json::Value) -> PatchDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parses_rfc6902_operations() {
        let doc = document(json!([
            { "op": "replace", "path": "/username", "value": "bob" },
            { "op": "remove", "path": "/firstName" },
            { "op": "move", "from": "/firstName", "path": "/lastName" }
        ]));

        assert_eq!(doc.operations().len(), 3);
        assert_eq!(
            doc.operations()[1],
            PatchOperation::Remove {
                path: "/firstName".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_op_fails_to_parse() {
        let result: Result<PatchDocument, _> =
            serde_json::from_value(json!([{ "op": "frobnicate", "path": "/username" }]));
        assert!(result.is_err());
    }

    #[test]
    fn test_operations_apply_in_order() {
        let doc = document(json!([
            { "op": "replace", "path": "/lastName", "value": "First" },
            { "op": "replace", "path": "/lastName", "value": "Second" }
        ]));

        let patched = apply_patch(&user(), &doc).unwrap();
        assert_eq!(patched.last_name.as_deref(), Some("Second"));
    }

    #[test]
    fn test_input_record_untouched() {
        let before = user();
        let doc = document(json!([{ "op": "replace", "path": "/username", "value": "bob" }]));

        let patched = apply_patch(&before, &doc).unwrap();
        assert_eq!(patched.username, "bob");
        assert_eq!(before.username, "alice");
    }

    #[test]
    fn test_copy_and_move() {
        let doc = document(json!([
            { "op": "copy", "from": "/username", "path": "/lastName" },
            { "op": "move", "from": "/firstName", "path": "/password" }
        ]));

        let patched = apply_patch(&user(), &doc).unwrap();
        assert_eq!(patched.last_name.as_deref(), Some("alice"));
        assert_eq!(patched.password, "Alice");
        assert_eq!(patched.first_name, None);
    }

    #[test]
    fn test_copy_id_into_text_field() {
        let doc = document(json!([{ "op": "copy", "from": "/id", "path": "/firstName" }]));

        let patched = apply_patch(&user(), &doc).unwrap();
        assert_eq!(patched.first_name.as_deref(), Some("1"));
        assert_eq!(patched.id, 1);
    }

    #[test]
    fn test_move_onto_itself_is_noop() {
        let doc = document(json!([{ "op": "move", "from": "/username", "path": "/USERNAME" }]));
        let patched = apply_patch(&user(), &doc).unwrap();
        assert_eq!(patched, user());
    }

    #[test]
    fn test_failed_test_operation_rejects_document() {
        let doc = document(json!([
            { "op": "test", "path": "/username", "value": "mallory" },
            { "op": "replace", "path": "/username", "value": "bob" }
        ]));

        let errors = apply_patch(&user(), &doc).unwrap_err();
        assert!(errors.get("username").is_some());
    }

    #[test]
    fn test_passing_test_operation() {
        let doc = document(json!([
            { "op": "test", "path": "/lastName", "value": null },
            { "op": "add", "path": "/lastName", "value": "Liddell" }
        ]));

        let patched = apply_patch(&user(), &doc).unwrap();
        assert_eq!(patched.last_name.as_deref(), Some("Liddell"));
    }

    #[test]
    fn test_all_operation_errors_collected() {
        let doc = document(json!([
            { "op": "replace", "path": "/id", "value": 5 },
            { "op": "replace", "path": "/nickname", "value": "al" },
            { "op": "remove", "path": "/password" }
        ]));

        let errors = apply_patch(&user(), &doc).unwrap_err();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(fields, vec!["id", "nickname", "password"]);
    }

    #[test]
    fn test_invalid_pointer() {
        let doc = document(json!([
            { "op": "replace", "path": "username", "value": "bob" },
            { "op": "replace", "path": "/name/first", "value": "bob" }
        ]));

        let errors = apply_patch(&user(), &doc).unwrap_err();
        assert_eq!(errors.fields().count(), 2);
    }

    #[test]
    fn test_constraint_violation_after_patch() {
        let doc = document(json!([{ "op": "replace", "path": "/username", "value": "" }]));

        let errors = apply_patch(&user(), &doc).unwrap_err();
        assert!(errors.get("username").is_some());
    }

    #[test]
    fn test_empty_document_is_identity() {
        let patched = apply_patch(&user(), &PatchDocument::default()).unwrap();
        assert_eq!(patched, user());
    }
}
