//! Savings goal model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Goal fields as a JSON object, used for create and partial update bodies
pub type GoalFields = Map<String, JsonValue>;

/// A savings goal
///
/// The client does not interpret goal fields; they are carried as sent so
/// that list/create/update round-trip whatever the backend defines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    #[serde(flatten)]
    pub fields: GoalFields,
}

impl Goal {
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.fields.get(field)
    }
}
