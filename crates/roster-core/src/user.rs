//! The user resource and its payload validation.

use crate::error::{ApiError, FieldErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a user's name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a user's role, in characters.
pub const MAX_ROLE_LEN: usize = 50;

/// Role assigned when a payload omits one.
pub const DEFAULT_ROLE: &str = "User";

/// A stored user record.
///
/// `id` and `created_at` are assigned by the store and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique, positive, store-assigned identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Unique email address (exact match).
    pub email: String,
    /// Free-form role, e.g. `Admin` or `User`.
    pub role: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// The validated fields a client may set: used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role.
    pub role: String,
}

impl NewUser {
    /// Creates a new user candidate without validating it.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role: role.into(),
        }
    }
}

/// A request body for `POST /users` or `PUT /users/{id}`, as received.
///
/// Unknown fields such as `id` or `createdAt` are ignored; clients cannot
/// set them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPayload {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Role, defaulting to [`DEFAULT_ROLE`].
    #[serde(default)]
    pub role: Option<String>,
}

impl UserPayload {
    /// Validates the payload, collecting every field failure.
    ///
    /// # Example
    ///
    /// ```
    /// use roster_core::UserPayload;
    ///
    /// let payload = UserPayload {
    ///     name: Some("Ann".into()),
    ///     email: Some("ann@x.com".into()),
    ///     role: None,
    /// };
    /// let user = payload.validate().unwrap();
    /// assert_eq!(user.role, "User");
    /// ```
    pub fn validate(self) -> Result<NewUser, ApiError> {
        let mut errors = FieldErrors::new();

        let name = match self.name {
            None => {
                errors.add("name", "The Name field is required.");
                String::new()
            }
            Some(name) => {
                if name.trim().is_empty() {
                    errors.add("name", "The Name field is required.");
                } else if name.chars().count() > MAX_NAME_LEN {
                    errors.add(
                        "name",
                        format!("The field Name must be a string with a maximum length of {MAX_NAME_LEN}."),
                    );
                }
                name
            }
        };

        let email = match self.email {
            None => {
                errors.add("email", "The Email field is required.");
                String::new()
            }
            Some(email) => {
                if email.trim().is_empty() {
                    errors.add("email", "The Email field is required.");
                } else if !is_valid_email(&email) {
                    errors.add("email", "The Email field is not a valid e-mail address.");
                }
                email
            }
        };

        let role = self.role.unwrap_or_else(|| DEFAULT_ROLE.to_string());
        if role.chars().count() > MAX_ROLE_LEN {
            errors.add(
                "role",
                format!("The field Role must be a string with a maximum length of {MAX_ROLE_LEN}."),
            );
        }

        if errors.is_empty() {
            Ok(NewUser { name, email, role })
        } else {
            Err(ApiError::validation(
                "One or more validation errors occurred.",
                errors,
            ))
        }
    }
}

/// Loose address check: `local@domain`, one `@`, no whitespace, and a domain
/// containing a `.` that is neither its first nor last character.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: Option<&str>, email: Option<&str>, role: Option<&str>) -> UserPayload {
        UserPayload {
            name: name.map(String::from),
            email: email.map(String::from),
            role: role.map(String::from),
        }
    }

    fn field_errors(err: ApiError) -> FieldErrors {
        match err {
            ApiError::Validation { field_errors, .. } => field_errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_payload() {
        let user = payload(Some("Ann"), Some("ann@x.com"), Some("Admin"))
            .validate()
            .unwrap();
        assert_eq!(user, NewUser::new("Ann", "ann@x.com", "Admin"));
    }

    #[test]
    fn test_role_defaults_to_user() {
        let user = payload(Some("Ann"), Some("ann@x.com"), None)
            .validate()
            .unwrap();
        assert_eq!(user.role, DEFAULT_ROLE);
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let errors = field_errors(payload(None, None, None).validate().unwrap_err());
        assert_eq!(errors.len(), 2);
        assert!(errors.get("name").is_some());
        assert!(errors.get("email").is_some());
    }

    #[test]
    fn test_blank_name_rejected() {
        let errors = field_errors(
            payload(Some("   "), Some("ann@x.com"), None)
                .validate()
                .unwrap_err(),
        );
        assert_eq!(errors.get("name").unwrap()[0], "The Name field is required.");
    }

    #[test]
    fn test_name_too_long() {
        let long = "a".repeat(MAX_NAME_LEN + 1);
        let errors = field_errors(
            payload(Some(&long), Some("ann@x.com"), None)
                .validate()
                .unwrap_err(),
        );
        assert!(errors.get("name").is_some());

        let exact = "a".repeat(MAX_NAME_LEN);
        assert!(payload(Some(&exact), Some("ann@x.com"), None).validate().is_ok());
    }

    #[test]
    fn test_role_too_long() {
        let long = "r".repeat(MAX_ROLE_LEN + 1);
        let errors = field_errors(
            payload(Some("Ann"), Some("ann@x.com"), Some(&long))
                .validate()
                .unwrap_err(),
        );
        assert!(errors.get("role").is_some());
    }

    #[test]
    fn test_email_shapes() {
        for good in ["ann@x.com", "a.b+c@mail.example.org", "x@y.z"] {
            assert!(is_valid_email(good), "{good} should be accepted");
        }
        for bad in [
            "ann",
            "@x.com",
            "ann@",
            "ann@x",
            "ann@.com",
            "ann@x.",
            "ann@x@y.com",
            "a nn@x.com",
        ] {
            assert!(!is_valid_email(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_payload_ignores_client_supplied_id() {
        let parsed: UserPayload =
            serde_json::from_str(r#"{"id":99,"name":"Ann","email":"ann@x.com","createdAt":"x"}"#)
                .unwrap();
        assert_eq!(parsed, payload(Some("Ann"), Some("ann@x.com"), None));
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let user = User {
            id: 1,
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            role: "Admin".to_string(),
            created_at: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00Z");
        assert!(json.get("created_at").is_none());
    }
}
