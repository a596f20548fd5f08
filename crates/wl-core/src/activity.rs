//! Bookable activities.

use serde::{Deserialize, Serialize};

use crate::store::Record;
use crate::types::{RecordId, UserId, ValidationError, require_text};

/// Attributes of an activity, without identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    pub user: UserId,
    pub project_name: String,
    pub activity_name: String,
    /// Grouping key for project-level reports.
    pub project_id: String,
    /// Sub-key within the project.
    pub activity_id: String,
    #[serde(default)]
    pub hidden: bool,
}

/// Fields to override when deriving a changed activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityChanges {
    pub project_name: Option<String>,
    pub activity_name: Option<String>,
    pub project_id: Option<String>,
    pub activity_id: Option<String>,
    pub hidden: Option<bool>,
}

/// A project/sub-activity pair a user can book time against.
///
/// Immutable: "changing" an activity yields a new value with the same id.
/// Hidden activities keep their historic bookings but accept no new ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredActivity")]
pub struct Activity {
    id: Option<RecordId>,
    user: UserId,
    project_name: String,
    activity_name: String,
    project_id: String,
    activity_id: String,
    hidden: bool,
}

#[derive(Deserialize)]
struct StoredActivity {
    id: Option<RecordId>,
    #[serde(flatten)]
    fields: NewActivity,
}

impl TryFrom<StoredActivity> for Activity {
    type Error = ValidationError;

    fn try_from(stored: StoredActivity) -> Result<Self, Self::Error> {
        let activity = Self::new(stored.fields)?;
        Ok(match stored.id {
            Some(id) => activity.with_id(id),
            None => activity,
        })
    }
}

impl Activity {
    /// Validates the attributes and builds an unsaved activity.
    pub fn new(fields: NewActivity) -> Result<Self, ValidationError> {
        Ok(Self {
            id: None,
            user: fields.user,
            project_name: require_text(fields.project_name, "project name")?,
            activity_name: require_text(fields.activity_name, "activity name")?,
            project_id: require_text(fields.project_id, "project id")?,
            activity_id: require_text(fields.activity_id, "activity id")?,
            hidden: fields.hidden,
        })
    }

    /// Re-derives the activity with the given overrides applied.
    pub fn with_changes(&self, changes: ActivityChanges) -> Result<Self, ValidationError> {
        let changed = Self::new(NewActivity {
            user: self.user.clone(),
            project_name: changes
                .project_name
                .unwrap_or_else(|| self.project_name.clone()),
            activity_name: changes
                .activity_name
                .unwrap_or_else(|| self.activity_name.clone()),
            project_id: changes
                .project_id
                .unwrap_or_else(|| self.project_id.clone()),
            activity_id: changes
                .activity_id
                .unwrap_or_else(|| self.activity_id.clone()),
            hidden: changes.hidden.unwrap_or(self.hidden),
        })?;
        Ok(Self {
            id: self.id,
            ..changed
        })
    }

    pub const fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub const fn user(&self) -> &UserId {
        &self.user
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn activity_name(&self) -> &str {
        &self.activity_name
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn activity_id(&self) -> &str {
        &self.activity_id
    }

    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// `projectId:activityId`, the activity-level grouping key.
    pub fn composite_id(&self) -> String {
        format!("{}:{}", self.project_id, self.activity_id)
    }

    /// `projectName:activityName`, the activity-level display name.
    pub fn display_name(&self) -> String {
        format!("{}:{}", self.project_name, self.activity_name)
    }
}

impl Record for Activity {
    const KIND: &'static str = "activity";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn with_id(self, id: RecordId) -> Self {
        Self { id: Some(id), ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewActivity {
        NewActivity {
            user: UserId::new("alice").unwrap(),
            project_name: "Time Tracker".to_string(),
            activity_name: "Development".to_string(),
            project_id: "TT".to_string(),
            activity_id: "DEV".to_string(),
            hidden: false,
        }
    }

    #[test]
    fn new_rejects_blank_fields() {
        let blank_project = NewActivity {
            project_name: " ".to_string(),
            ..sample()
        };
        assert_eq!(
            Activity::new(blank_project).unwrap_err(),
            ValidationError::Empty {
                field: "project name"
            }
        );

        let blank_activity_id = NewActivity {
            activity_id: String::new(),
            ..sample()
        };
        assert!(Activity::new(blank_activity_id).is_err());
    }

    #[test]
    fn keys_and_display_names() {
        let activity = Activity::new(sample()).unwrap();
        assert_eq!(activity.composite_id(), "TT:DEV");
        assert_eq!(activity.display_name(), "Time Tracker:Development");
        assert_eq!(activity.id(), None);
    }

    #[test]
    fn with_changes_keeps_identity() {
        let activity = Activity::new(sample()).unwrap().with_id(RecordId::new(3));
        let hidden = activity
            .with_changes(ActivityChanges {
                hidden: Some(true),
                ..ActivityChanges::default()
            })
            .unwrap();

        assert_eq!(hidden.id(), Some(RecordId::new(3)));
        assert!(hidden.is_hidden());
        assert!(!activity.is_hidden());
        assert_eq!(hidden.project_id(), "TT");
    }

    #[test]
    fn with_changes_revalidates() {
        let activity = Activity::new(sample()).unwrap();
        let result = activity.with_changes(ActivityChanges {
            activity_name: Some(String::new()),
            ..ActivityChanges::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn serde_roundtrip_keeps_id() {
        let activity = Activity::new(sample()).unwrap().with_id(RecordId::new(9));
        let json = serde_json::to_string(&activity).unwrap();
        let parsed: Activity = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, activity);
    }

    #[test]
    fn deserialize_validates_fields() {
        let json = r#"{
            "id": 1,
            "user": "alice",
            "project_name": "",
            "activity_name": "Dev",
            "project_id": "TT",
            "activity_id": "DEV"
        }"#;
        let result: Result<Activity, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
