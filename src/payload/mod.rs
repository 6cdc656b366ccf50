// ABOUTME: Working payload threaded between workflow steps
// ABOUTME: Order-preserving JSON map with merge, volatile reset, and identity field accessors

pub mod error;
pub mod message;
pub mod path;

pub use error::{PayloadError, Result};
pub use message::{Activity, ActivityMessage};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FROM: &str = "from";
pub const TO: &str = "to";
pub const SENDER: &str = "sender";
pub const WORKFLOW_ID: &str = "workflowID";
pub const ROUTE_ID: &str = "routeID";
pub const INVOKED_BY: &str = "invokedBy";
pub const DEBUG: &str = "debug";
pub const PATHCHAIN_ID: &str = "pathchainID";
pub const ACTIVITY_ID: &str = "activityID";

/// Schema-flexible working document carried from one tick to the next.
///
/// Identity fields the engine reads and writes have typed accessors; every
/// other key is left to action handlers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(IndexMap<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a payload from its JSON wire form. An empty document decodes to
    /// an empty payload.
    pub fn from_json(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str(raw).map_err(PayloadError::Decode)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(PayloadError::Encode)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(PayloadError::Encode)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// Build a payload from a JSON object value; anything else is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map.into_iter().collect())),
            other => Err(PayloadError::NotAnObject(json_type_name(&other))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow key-wise union: every key of `overlay` replaces the value held
    /// here, keys only present here are kept.
    pub fn merge(&mut self, overlay: &Payload) {
        for (key, value) in &overlay.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Consuming form of [`Payload::merge`] for builder-style use.
    pub fn merged(mut self, overlay: &Payload) -> Self {
        self.merge(overlay);
        self
    }

    /// Reset the named per-tick collections to empty arrays. Keys that are
    /// absent or do not hold an array are left untouched.
    pub fn empty_volatile_arrays(&mut self, fields: &[String]) {
        for field in fields {
            if let Some(Value::Array(items)) = self.0.get_mut(field) {
                items.clear();
            }
        }
    }

    /// Resolve a dotted field path against this payload and render the hit as text.
    pub fn lookup(&self, path: &str) -> Option<String> {
        let mut segments = path::segments(path);
        let first = segments.next()?;
        let root = self.0.get(first)?;
        path::walk(root, segments).and_then(path::render)
    }

    pub fn from_actor(&self) -> String {
        self.string_field(FROM)
    }

    pub fn set_from(&mut self, from: impl Into<String>) {
        self.insert(FROM, from.into());
    }

    /// Recipient names. Only string entries of the `to` array are returned;
    /// use [`Payload::add_recipient`] to extend `to` without losing the rest.
    pub fn to(&self) -> Vec<String> {
        match self.0.get(TO) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn set_to(&mut self, recipients: Vec<String>) {
        self.insert(TO, recipients);
    }

    /// Append one recipient, keeping every existing `to` entry as is. A
    /// single non-array value becomes the first entry of the list.
    pub fn add_recipient(&mut self, recipient: impl Into<String>) {
        let slot = self.0.entry(TO.to_string()).or_insert(Value::Null);
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        if !slot.is_array() {
            let single = slot.take();
            *slot = Value::Array(vec![single]);
        }
        if let Value::Array(items) = slot {
            items.push(Value::String(recipient.into()));
        }
    }

    /// Whether the `to` array holds any entry, string or not.
    pub fn has_recipients(&self) -> bool {
        matches!(self.0.get(TO), Some(Value::Array(items)) if !items.is_empty())
    }

    pub fn sender(&self) -> String {
        self.string_field(SENDER)
    }

    pub fn set_sender(&mut self, sender: impl Into<String>) {
        self.insert(SENDER, sender.into());
    }

    pub fn workflow_id(&self) -> String {
        self.string_field(WORKFLOW_ID)
    }

    pub fn set_workflow_id(&mut self, id: impl Into<String>) {
        self.insert(WORKFLOW_ID, id.into());
    }

    pub fn route_id(&self) -> String {
        self.string_field(ROUTE_ID)
    }

    pub fn set_route_id(&mut self, route: impl Into<String>) {
        self.insert(ROUTE_ID, route.into());
    }

    pub fn invoked_by(&self) -> String {
        self.string_field(INVOKED_BY)
    }

    pub fn set_invoked_by(&mut self, actor: impl Into<String>) {
        self.insert(INVOKED_BY, actor.into());
    }

    pub fn pathchain_id(&self) -> String {
        self.string_field(PATHCHAIN_ID)
    }

    pub fn set_pathchain_id(&mut self, id: impl Into<String>) {
        self.insert(PATHCHAIN_ID, id.into());
    }

    pub fn activity_id(&self) -> String {
        self.string_field(ACTIVITY_ID)
    }

    pub fn set_activity_id(&mut self, id: impl Into<String>) {
        self.insert(ACTIVITY_ID, id.into());
    }

    /// Debug mode is on for a JSON `true` or the string `"true"`.
    pub fn debug(&self) -> bool {
        match self.0.get(DEBUG) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.insert(DEBUG, debug);
    }

    fn string_field(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }
}

impl From<IndexMap<String, Value>> for Payload {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Payload {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
