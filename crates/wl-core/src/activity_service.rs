//! Activity bookkeeping.

use tracing::debug;

use crate::activity::{Activity, ActivityChanges, NewActivity};
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::UserId;

/// Creates, hides and lists activities through an activity store.
pub struct ActivityService<'a, S> {
    activities: &'a S,
}

impl<'a, S: Store<Activity>> ActivityService<'a, S> {
    pub const fn new(activities: &'a S) -> Self {
        Self { activities }
    }

    pub fn add_activity(&self, fields: NewActivity) -> Result<Activity> {
        let activity = self.activities.save(Activity::new(fields)?)?;
        debug!(activity = ?activity.id(), key = %activity.composite_id(), "added activity");
        Ok(activity)
    }

    /// Stores a copy of `activity` with the hidden flag set to `hidden`.
    pub fn set_hidden(&self, activity: &Activity, hidden: bool) -> Result<Activity> {
        if activity.id().is_none() {
            return Err(Error::InvalidInput(
                "only saved activities can be hidden".to_string(),
            ));
        }
        let changed = activity.with_changes(ActivityChanges {
            hidden: Some(hidden),
            ..ActivityChanges::default()
        })?;
        Ok(self.activities.save(changed)?)
    }

    /// The user's activities ordered by `projectId:activityId`.
    pub fn activities(&self, user: &UserId, include_hidden: bool) -> Result<Vec<Activity>> {
        let mut activities: Vec<Activity> = self
            .activities
            .store_all()?
            .into_iter()
            .filter(|activity| activity.user() == user)
            .filter(|activity| include_hidden || !activity.is_hidden())
            .collect();
        activities.sort_by_key(|activity| (activity.composite_id().to_lowercase(), activity.id()));
        Ok(activities)
    }

    /// Activities the user can still book against.
    pub fn visible_activities(&self, user: &UserId) -> Result<Vec<Activity>> {
        self.activities(user, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::user;

    fn fields(owner: &str, project_id: &str, activity_id: &str) -> NewActivity {
        NewActivity {
            user: user(owner),
            project_name: format!("Project {project_id}"),
            activity_name: format!("Activity {activity_id}"),
            project_id: project_id.to_string(),
            activity_id: activity_id.to_string(),
            hidden: false,
        }
    }

    #[test]
    fn add_activity_assigns_id() {
        let store = MemoryStore::new();
        let service = ActivityService::new(&store);
        let activity = service.add_activity(fields("alice", "TT", "DEV")).unwrap();
        assert!(activity.id().is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn add_activity_rejects_invalid_fields() {
        let store = MemoryStore::new();
        let service = ActivityService::new(&store);
        let result = service.add_activity(NewActivity {
            project_id: String::new(),
            ..fields("alice", "TT", "DEV")
        });
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn hidden_activities_are_filtered_from_visible_list() {
        let store = MemoryStore::new();
        let service = ActivityService::new(&store);
        let dev = service.add_activity(fields("alice", "TT", "DEV")).unwrap();
        service.add_activity(fields("alice", "TT", "OPS")).unwrap();
        service.add_activity(fields("bob", "TT", "QA")).unwrap();

        let hidden = service.set_hidden(&dev, true).unwrap();
        assert_eq!(hidden.id(), dev.id());
        assert!(hidden.is_hidden());

        let visible = service.visible_activities(&user("alice")).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].activity_id(), "OPS");

        let all = service.activities(&user("alice"), true).unwrap();
        let keys: Vec<String> = all.iter().map(Activity::composite_id).collect();
        assert_eq!(keys, vec!["TT:DEV", "TT:OPS"]);
    }

    #[test]
    fn unhiding_restores_visibility() {
        let store = MemoryStore::new();
        let service = ActivityService::new(&store);
        let dev = service.add_activity(fields("alice", "TT", "DEV")).unwrap();
        let hidden = service.set_hidden(&dev, true).unwrap();
        service.set_hidden(&hidden, false).unwrap();

        assert_eq!(service.visible_activities(&user("alice")).unwrap().len(), 1);
    }
}
