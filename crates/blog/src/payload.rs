//! Request payloads and their field validation.
//!
//! Read-only fields (`id`, `author`, `post`, `pub_date`, `created`, `user`) are
//! accepted and ignored. Reference checks that need the store (group exists,
//! user exists) are done by the handlers on top of these static checks.

use serde::{Deserialize, Deserializer};

use yatube_core::{FieldErrors, GroupId};

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";

/// How strictly a payload is checked.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Create and PUT: required fields must be present.
    Full,
    /// PATCH: only the fields sent are checked.
    Partial,
}

/// Distinguish "absent" (`None`) from "explicit null" (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn clean_text(
    field: &str,
    value: Option<Option<String>>,
    mode: Mode,
    errors: &mut FieldErrors,
) -> Option<String> {
    match value {
        None => {
            if mode == Mode::Full {
                errors.add(field, REQUIRED);
            }
            None
        }
        Some(None) => {
            errors.add(field, NOT_NULL);
            None
        }
        Some(Some(s)) if s.trim().is_empty() => {
            errors.add(field, NOT_BLANK);
            None
        }
        Some(Some(s)) => Some(s.trim().to_string()),
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PostPayload {
    #[serde(default, deserialize_with = "nullable")]
    pub text: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub group: Option<Option<GroupId>>,
}

/// Validated post fields; `None` means "leave unchanged".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    pub text: Option<String>,
    pub group: Option<Option<GroupId>>,
}

impl PostPayload {
    pub fn clean(self, mode: Mode, errors: &mut FieldErrors) -> PostChanges {
        PostChanges {
            text: clean_text("text", self.text, mode, errors),
            group: self.group,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CommentPayload {
    #[serde(default, deserialize_with = "nullable")]
    pub text: Option<Option<String>>,
}

impl CommentPayload {
    pub fn clean(self, mode: Mode, errors: &mut FieldErrors) -> Option<String> {
        clean_text("text", self.text, mode, errors)
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FollowPayload {
    #[serde(default, deserialize_with = "nullable")]
    pub following: Option<Option<String>>,
}

impl FollowPayload {
    /// The requested username, if statically valid.
    ///
    /// Unlike free text the value is not trimmed: usernames are looked up
    /// exactly as sent.
    pub fn clean(self, errors: &mut FieldErrors) -> Option<String> {
        let raw = self.following.clone().flatten();
        clean_text("following", self.following, Mode::Full, errors).and(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(value: serde_json::Value) -> PostPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn full_mode_requires_text() {
        let mut errors = FieldErrors::new();
        post(json!({ "group": 1 })).clean(Mode::Full, &mut errors);
        assert_eq!(errors.get("text").unwrap(), [REQUIRED.to_string()]);
    }

    #[test]
    fn partial_mode_accepts_missing_text() {
        let mut errors = FieldErrors::new();
        let changes = post(json!({ "group": null })).clean(Mode::Partial, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(changes.text, None);
        assert_eq!(changes.group, Some(None));
    }

    #[test]
    fn blank_and_null_text_are_rejected_in_any_mode() {
        let mut errors = FieldErrors::new();
        post(json!({ "text": "   " })).clean(Mode::Partial, &mut errors);
        assert_eq!(errors.get("text").unwrap(), [NOT_BLANK.to_string()]);

        let mut errors = FieldErrors::new();
        post(json!({ "text": null })).clean(Mode::Full, &mut errors);
        assert_eq!(errors.get("text").unwrap(), [NOT_NULL.to_string()]);
    }

    #[test]
    fn read_only_fields_are_ignored_and_text_is_trimmed() {
        let mut errors = FieldErrors::new();
        let changes = post(json!({ "text": "  hi  ", "author": "mallory", "id": 99 }))
            .clean(Mode::Full, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(changes.text.as_deref(), Some("hi"));
        assert_eq!(changes.group, None);
    }

    #[test]
    fn wrong_types_fail_to_deserialize() {
        assert!(serde_json::from_value::<PostPayload>(json!({ "text": 5 })).is_err());
        assert!(serde_json::from_value::<PostPayload>(json!({ "text": "a", "group": "one" })).is_err());
    }

    #[test]
    fn follow_username_is_kept_verbatim() {
        let mut errors = FieldErrors::new();
        let payload: FollowPayload = serde_json::from_value(json!({ "following": " bob " })).unwrap();
        assert_eq!(payload.clean(&mut errors).as_deref(), Some(" bob "));
        assert!(errors.is_empty());

        let mut errors = FieldErrors::new();
        let payload: FollowPayload = serde_json::from_value(json!({ "following": "  " })).unwrap();
        assert_eq!(payload.clean(&mut errors), None);
        assert_eq!(errors.get("following").unwrap(), [NOT_BLANK.to_string()]);
    }

    #[test]
    fn follow_requires_username() {
        let mut errors = FieldErrors::new();
        let username = FollowPayload::default().clean(&mut errors);
        assert_eq!(username, None);
        assert_eq!(errors.get("following").unwrap(), [REQUIRED.to_string()]);
    }
}
