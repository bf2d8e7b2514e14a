//! User domain entity and related types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::patch::{PatchError, Patchable};
use crate::config::{MAX_API_KEY_LENGTH, MAX_NAME_LENGTH, MAX_PASSWORD_LENGTH, MAX_USERNAME_LENGTH};

/// User domain entity
///
/// Serialized as-is to clients, password included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned identifier
    #[schema(example = 1)]
    pub id: i32,
    #[validate(length(min = 1, max = MAX_USERNAME_LENGTH))]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(length(min = 1, max = MAX_PASSWORD_LENGTH))]
    #[schema(example = "p1")]
    pub password: String,
    #[validate(length(max = MAX_NAME_LENGTH))]
    #[schema(example = "Alice")]
    pub first_name: Option<String>,
    #[validate(length(max = MAX_NAME_LENGTH))]
    #[schema(example = "Liddell")]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = MAX_API_KEY_LENGTH))]
    #[schema(example = "3f2b9c1e-5d7a-4e8f-9a0b-1c2d3e4f5a6b")]
    pub api_key: String,
}

impl User {
    /// Overwrite every mutable field from `other`, keeping `id`.
    pub fn replace_fields(&mut self, other: User) {
        self.username = other.username;
        self.password = other.password;
        self.first_name = other.first_name;
        self.last_name = other.last_name;
        self.api_key = other.api_key;
    }
}

/// Data for a user that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub api_key: String,
}

/// Fresh opaque API key: a hyphenated v4 UUID (36 characters).
pub fn generate_api_key() -> String {
    Uuid::new_v4().to_string()
}

/// Field names as they appear in JSON and patch paths.
const FIELDS: &[&str] = &["id", "username", "password", "firstName", "lastName", "apiKey"];

fn canonical_field(path: &str) -> Option<&'static str> {
    FIELDS
        .iter()
        .copied()
        .find(|name| name.eq_ignore_ascii_case(path))
}

/// Text form of a scalar patch value; numbers and booleans are converted.
fn scalar_text(field: &str, value: Value) -> Result<Option<String>, PatchError> {
    match value {
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Null => Ok(None),
        other => Err(PatchError::new(
            field,
            format!("The value '{}' is not valid for {}.", other, field),
        )),
    }
}

fn required_string(field: &str, value: Value) -> Result<String, PatchError> {
    scalar_text(field, value)?.ok_or_else(|| {
        PatchError::new(field, format!("The {} field is required.", field))
    })
}

fn optional_string(field: &str, value: Value) -> Result<Option<String>, PatchError> {
    scalar_text(field, value)
}

impl Patchable for User {
    fn read(&self, path: &str) -> Result<Value, PatchError> {
        let field = canonical_field(path).ok_or_else(|| PatchError::unknown_path(path))?;
        Ok(match field {
            "id" => Value::from(self.id),
            "username" => Value::from(self.username.clone()),
            "password" => Value::from(self.password.clone()),
            "firstName" => self.first_name.clone().map_or(Value::Null, Value::from),
            "lastName" => self.last_name.clone().map_or(Value::Null, Value::from),
            _ => Value::from(self.api_key.clone()),
        })
    }

    fn write(&mut self, path: &str, value: Value) -> Result<(), PatchError> {
        let field = canonical_field(path).ok_or_else(|| PatchError::unknown_path(path))?;
        match field {
            "id" => {
                return Err(PatchError::new(field, "The id field cannot be modified."));
            }
            "username" => self.username = required_string(field, value)?,
            "password" => self.password = required_string(field, value)?,
            "firstName" => self.first_name = optional_string(field, value)?,
            "lastName" => self.last_name = optional_string(field, value)?,
            _ => self.api_key = required_string(field, value)?,
        }
        Ok(())
    }
}
