//! Savings goals

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::domain::{Goal, GoalFields};
use crate::ports::BackendApi;

pub struct GoalService {
    api: Arc<dyn BackendApi>,
}

impl GoalService {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Goal>> {
        self.api.list_goals().await
    }

    pub async fn create(&self, fields: GoalFields) -> Result<Goal> {
        Self::check_fields(&fields)?;
        self.api.create_goal(&fields).await
    }

    /// Partial update: only the given fields are sent
    pub async fn update(&self, id: i64, fields: GoalFields) -> Result<Goal> {
        Self::check_fields(&fields)?;
        self.api.update_goal(id, &fields).await
    }

    fn check_fields(fields: &GoalFields) -> Result<()> {
        if fields.is_empty() {
            return Err(Error::validation("At least one goal field is required"));
        }
        if fields.contains_key("id") {
            return Err(Error::validation("The goal id cannot be set as a field"));
        }
        Ok(())
    }
}

/// Parse `key=value` pairs into goal fields
///
/// Values that read as JSON (numbers, booleans, quoted strings, objects)
/// keep that type; anything else is taken as a plain string.
pub fn parse_goal_fields<S: AsRef<str>>(pairs: &[S]) -> Result<GoalFields> {
    let mut fields = GoalFields::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::validation(format!("Expected key=value, got '{}'", pair)))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::validation(format!("Missing field name in '{}'", pair)));
        }
        let value = value.trim();
        let value = serde_json::from_str::<JsonValue>(value)
            .unwrap_or_else(|_| JsonValue::String(value.to_string()));
        fields.insert(key.to_string(), value);
    }
    Ok(fields)
}
