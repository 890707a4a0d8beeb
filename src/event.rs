use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// One error occurrence as returned by the events API.
///
/// The payload is kept as an opaque JSON document; only `id` and
/// `received_at` are interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorEvent(Value);

impl ErrorEvent {
    pub fn new(value: Value) -> Self {
        ErrorEvent(value)
    }

    /// The event id. Numeric ids are not expected from the API but are
    /// accepted and compared by their textual form.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// When the API received the event
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.0.get("received_at")?.as_str().and_then(parse_timestamp)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for ErrorEvent {
    fn from(value: Value) -> Self {
        ErrorEvent(value)
    }
}

/// Parse the timestamp forms seen in event payloads: RFC 3339
/// (`2022-01-01T00:00:00.000Z`) and `2022-01-01 00:00:00.000 UTC`.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    let naive = s.strip_suffix(" UTC")?;
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|ts| ts.and_utc())
}

/// Ordered collection of events, unique by id.
///
/// Insertion order is discovery order. A later event with an id that is
/// already present is dropped; the earlier one keeps its position.
/// Events without an id cannot be compared and are always kept.
#[derive(Debug, Clone, Default)]
pub struct EventSet {
    events: Vec<ErrorEvent>,
    seen: HashSet<String>,
}

impl EventSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event, returns false if its id was already present
    pub fn push(&mut self, event: ErrorEvent) -> bool {
        if let Some(id) = event.id() {
            if !self.seen.insert(id) {
                return false;
            }
        }
        self.events.push(event);
        true
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ErrorEvent> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[ErrorEvent] {
        &self.events
    }

    pub fn into_vec(self) -> Vec<ErrorEvent> {
        self.events
    }
}

impl Extend<ErrorEvent> for EventSet {
    fn extend<T: IntoIterator<Item = ErrorEvent>>(&mut self, iter: T) {
        for event in iter {
            self.push(event);
        }
    }
}

impl FromIterator<ErrorEvent> for EventSet {
    fn from_iter<T: IntoIterator<Item = ErrorEvent>>(iter: T) -> Self {
        let mut set = EventSet::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for EventSet {
    type Item = ErrorEvent;
    type IntoIter = std::vec::IntoIter<ErrorEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a EventSet {
    type Item = &'a ErrorEvent;
    type IntoIter = std::slice::Iter<'a, ErrorEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn event(id: &str) -> ErrorEvent {
        ErrorEvent::new(json!({"id": id, "received_at": "2022-01-01T00:00:00.000Z"}))
    }

    #[test]
    fn test_event_accessors() {
        let ev = event("33333");
        assert_eq!(ev.id().as_deref(), Some("33333"));
        assert_eq!(
            ev.received_at(),
            Some(Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap())
        );

        let numeric = ErrorEvent::new(json!({"id": 7}));
        assert_eq!(numeric.id().as_deref(), Some("7"));
        assert_eq!(numeric.received_at(), None);
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2022, 1, 1, 12, 30, 5).unwrap();
        assert_eq!(parse_timestamp("2022-01-01T12:30:05Z"), Some(expected));
        assert_eq!(parse_timestamp("2022-01-01T13:30:05+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2022-01-01 12:30:05.000 UTC"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_event_set_keeps_first_occurrence() {
        let mut set = EventSet::new();
        assert!(set.push(event("1")));
        assert!(set.push(event("2")));
        let replacement = ErrorEvent::new(json!({"id": "1", "other": true}));
        assert!(!set.push(replacement));

        let ids: Vec<_> = set.iter().filter_map(|e| e.id()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(set.as_slice()[0], event("1"));
    }

    #[test]
    fn test_events_without_id_are_kept() {
        let set: EventSet = vec![
            ErrorEvent::new(json!({"message": "a"})),
            ErrorEvent::new(json!({"message": "a"})),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_serializes_transparently() {
        let ev = event("9");
        let text = serde_json::to_string(&ev).unwrap();
        assert_eq!(text, r#"{"id":"9","received_at":"2022-01-01T00:00:00.000Z"}"#);
        let back: ErrorEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(back, ev);
    }
}
