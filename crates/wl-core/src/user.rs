//! Users owning bookings and activities.

use serde::{Deserialize, Serialize};

use crate::store::Record;
use crate::types::{RecordId, UserId};

/// A user known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    id: Option<RecordId>,
    name: UserId,
}

impl User {
    #[must_use]
    pub const fn new(name: UserId) -> Self {
        Self { id: None, name }
    }

    pub const fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub const fn name(&self) -> &UserId {
        &self.name
    }
}

impl Record for User {
    const KIND: &'static str = "user";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn with_id(self, id: RecordId) -> Self {
        Self { id: Some(id), ..self }
    }
}
