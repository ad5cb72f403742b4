use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use derive_more::{AsRef, Deref, Display};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

const DEFAULT_USER: &str = "default";

#[derive(
    AsRef, Deref, Display, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserID(String);

impl UserID {
    /// The user that exists on every device, also when nobody has ever signed in.
    #[must_use]
    pub fn default_user() -> Self {
        Self(DEFAULT_USER.to_string())
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_USER
    }

    /// Storage key of the user's workout collection.
    #[must_use]
    pub fn workouts_key(&self) -> String {
        if self.is_default() {
            "workouts".to_string()
        } else {
            format!("{}_workouts", self.0)
        }
    }
}

impl Default for UserID {
    fn default() -> Self {
        Self::default_user()
    }
}

impl From<&str> for UserID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserID,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    #[must_use]
    pub fn new(id: UserID, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: String::new(),
            created_at: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn default_user() -> Self {
        Self::new(UserID::default_user(), "Default User")
    }
}

/// Profiles keyed by user id, as persisted under `userProfiles`.
pub type UserProfiles = BTreeMap<UserID, UserProfile>;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::default_user(UserID::default_user(), "workouts")]
    #[case::other_user(UserID::from("alice"), "alice_workouts")]
    #[case::named_default(UserID::from("default"), "workouts")]
    fn test_user_id_workouts_key(#[case] id: UserID, #[case] expected: &str) {
        assert_eq!(id.workouts_key(), expected);
    }

    #[test]
    fn test_user_profiles_deserialize() {
        let profiles: UserProfiles = serde_json::from_value(json!({
            "default": {"id": "default", "name": "Default User", "email": ""},
            "u-42": {
                "id": "u-42",
                "name": "Sam",
                "email": "sam@example.com",
                "createdAt": "2025-11-02T18:30:00Z",
                "photoURL": "https://example.com/sam.png"
            }
        }))
        .unwrap();

        let sam = &profiles[&UserID::from("u-42")];
        assert_eq!(sam.name, "Sam");
        assert_eq!(
            sam.created_at.map(|t| t.to_rfc3339()),
            Some("2025-11-02T18:30:00+00:00".to_string())
        );
        assert_eq!(
            sam.extra.get("photoURL"),
            Some(&json!("https://example.com/sam.png"))
        );
        assert_eq!(
            profiles[&UserID::default_user()],
            UserProfile::default_user()
        );
    }

    #[test]
    fn test_user_profile_deserialize_without_name() {
        let profile: UserProfile =
            serde_json::from_value(json!({"id": "u1", "name": null, "email": "kim@example.com"}))
                .unwrap();

        assert_eq!(
            profile,
            UserProfile {
                email: "kim@example.com".to_string(),
                ..UserProfile::new(UserID::from("u1"), "")
            }
        );
    }
}
