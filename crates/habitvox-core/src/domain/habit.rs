//! Habit stack and daily check-in domain types.
//!
//! A [`HabitStack`] is what the sheet-store hands back for a user and day;
//! a [`DailyResponseSet`] is what a check-in session builds up while it
//! walks that stack. Both use the store's slot keys (`habit_1` … `habit_5`)
//! as habit identifiers.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of slots in a habit stack.
pub const MAX_HABITS: usize = 5;

/// Prefix of the slot keys used by the sheet-store.
const SLOT_PREFIX: &str = "habit_";

/// One non-empty slot of a habit stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitSlot {
    /// Slot key as stored upstream (e.g. `"habit_2"`).
    pub key: String,
    /// Habit description spoken to the user.
    pub text: String,
}

/// Ordered, read-only set of habits for one user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HabitStack {
    slots: Vec<HabitSlot>,
    updated_at: Option<DateTime<Utc>>,
}

impl HabitStack {
    /// Build a stack from already-ordered slots.
    ///
    /// Slots with blank text are dropped and at most [`MAX_HABITS`] are kept.
    pub fn new(slots: Vec<HabitSlot>) -> Self {
        let slots = slots
            .into_iter()
            .filter_map(|slot| {
                let text = slot.text.trim();
                (!text.is_empty()).then(|| HabitSlot {
                    key: slot.key,
                    text: text.to_string(),
                })
            })
            .take(MAX_HABITS)
            .collect();
        Self {
            slots,
            updated_at: None,
        }
    }

    /// Build a stack from the store's wire object
    /// (`{"habit_1": "...", ..., "last_updated": "..."}`).
    ///
    /// Keys are ordered by their numeric suffix, not by map order. Unknown
    /// keys and non-string values are ignored.
    pub fn from_wire(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut numbered: Vec<(u32, HabitSlot)> = object
            .iter()
            .filter_map(|(key, value)| {
                let index = key.strip_prefix(SLOT_PREFIX)?.parse::<u32>().ok()?;
                let text = value.as_str()?;
                Some((
                    index,
                    HabitSlot {
                        key: key.clone(),
                        text: text.to_string(),
                    },
                ))
            })
            .collect();
        numbered.sort_by_key(|(index, _)| *index);

        let updated_at = ["last_updated", "updated_at"]
            .iter()
            .filter_map(|field| object.get(*field).and_then(serde_json::Value::as_str))
            .find_map(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&Utc));

        let mut stack = Self::new(numbered.into_iter().map(|(_, slot)| slot).collect());
        stack.updated_at = updated_at;
        stack
    }

    /// Attach the upstream last-updated timestamp.
    #[must_use]
    pub const fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn slots(&self) -> &[HabitSlot] {
        &self.slots
    }

    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Recorded answer for a single habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HabitResponse {
    /// The habit was completed (`"yes"` on the wire).
    #[serde(rename = "yes")]
    Completed,
    /// The habit was not completed (`"no"` on the wire).
    #[serde(rename = "no")]
    NotCompleted,
    /// The user chose not to answer for this habit (`"skip"` on the wire).
    #[serde(rename = "skip")]
    Skipped,
}

impl HabitResponse {
    /// Wire label understood by the daily-log endpoint.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "yes",
            Self::NotCompleted => "no",
            Self::Skipped => "skip",
        }
    }
}

/// Responses accumulated during one check-in.
///
/// Each habit key can be recorded at most once; later attempts are ignored
/// and reported back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyResponseSet {
    responses: BTreeMap<String, HabitResponse>,
}

impl DailyResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a response for `key`.
    ///
    /// Returns `false` (and leaves the set unchanged) if the key already has
    /// a response.
    pub fn record(&mut self, key: impl Into<String>, response: HabitResponse) -> bool {
        let key = key.into();
        if self.responses.contains_key(&key) {
            tracing::warn!(habit = %key, "Ignoring duplicate response");
            return false;
        }
        self.responses.insert(key, response);
        true
    }

    pub fn get(&self, key: &str) -> Option<HabitResponse> {
        self.responses.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, HabitResponse)> {
        self.responses.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Serialize for DailyResponseSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.responses.len()))?;
        for (key, response) in &self.responses {
            map.serialize_entry(key, response.as_str())?;
        }
        map.end()
    }
}

/// Payload posted to the daily-log endpoint at the end of a check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyLog {
    /// Check-in date, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub responses: DailyResponseSet,
    /// Free-text reflection; empty when the user declined.
    pub reflection: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn from_wire_orders_by_slot_number_and_skips_blanks() {
        let stack = HabitStack::from_wire(&wire(json!({
            "habit_3": "Meditate",
            "habit_1": "Drink water",
            "habit_2": "   ",
            "habit_10": "Read",
            "user_id": "u1",
        })));

        let keys: Vec<&str> = stack.slots().iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["habit_1", "habit_3", "habit_10"]);
        assert_eq!(stack.slots()[0].text, "Drink water");
    }

    #[test]
    fn from_wire_parses_last_updated() {
        let stack = HabitStack::from_wire(&wire(json!({
            "habit_1": "Stretch",
            "last_updated": "2026-10-18T07:30:00Z",
        })));
        assert!(stack.updated_at().is_some());
    }

    #[test]
    fn stack_caps_at_max_habits() {
        let slots = (1..=7)
            .map(|i| HabitSlot {
                key: format!("habit_{i}"),
                text: format!("habit {i}"),
            })
            .collect();
        assert_eq!(HabitStack::new(slots).len(), MAX_HABITS);
    }

    #[test]
    fn response_set_records_each_key_once() {
        let mut set = DailyResponseSet::new();
        assert!(set.record("habit_1", HabitResponse::Completed));
        assert!(!set.record("habit_1", HabitResponse::NotCompleted));
        assert_eq!(set.get("habit_1"), Some(HabitResponse::Completed));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn daily_log_serializes_wire_shape() {
        let mut responses = DailyResponseSet::new();
        responses.record("habit_1", HabitResponse::Completed);
        responses.record("habit_2", HabitResponse::NotCompleted);
        responses.record("habit_3", HabitResponse::Skipped);
        let log = DailyLog {
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            responses,
            reflection: String::new(),
        };

        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(
            value,
            json!({
                "date": "2026-10-19",
                "responses": {"habit_1": "yes", "habit_2": "no", "habit_3": "skip"},
                "reflection": "",
            })
        );
    }
}
