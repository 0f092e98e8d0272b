//! Editing state for one content document.
//!
//! The session keeps the serialized form of the last loaded or saved document
//! as a snapshot; the document is dirty whenever its current serialized form
//! differs from that snapshot. Edits address values with JSON pointers
//! (`/villaIntro/stats/0/value`).
//!
//! The session also holds the version token of the revision it was loaded
//! from. A save presents it, so a document changed by someone else since the
//! load is rejected rather than overwritten.

use crate::error::EditorError;
use serde_json::Value;
use villa_site_core::DocumentKind;

#[derive(Debug, Clone)]
pub struct EditorSession {
    kind: DocumentKind,
    snapshot: String,
    current: Value,
    version: Option<String>,
}

fn serialize(value: &Value) -> String {
    // Value serialization cannot fail
    serde_json::to_string(value).unwrap_or_default()
}

/// Split `/a/b/3` into the parent pointer `/a/b` and the last token `3`
fn split_pointer(pointer: &str) -> Result<(&str, String), EditorError> {
    if pointer.is_empty() {
        return Err(EditorError::InvalidPointer(pointer.to_string()));
    }
    let idx = pointer
        .rfind('/')
        .ok_or_else(|| EditorError::InvalidPointer(pointer.to_string()))?;
    let token = pointer[idx + 1..].replace("~1", "/").replace("~0", "~");
    Ok((&pointer[..idx], token))
}

fn parse_index(token: &str, pointer: &str) -> Result<usize, EditorError> {
    token
        .parse()
        .map_err(|_| EditorError::InvalidPointer(pointer.to_string()))
}

impl EditorSession {
    /// Session over a document that has no stored revision yet
    pub fn new(kind: DocumentKind, content: Value) -> Self {
        Self {
            kind,
            snapshot: serialize(&content),
            current: content,
            version: None,
        }
    }

    /// Session over a stored revision
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Token of the revision the session is based on
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn content(&self) -> &Value {
        &self.current
    }

    pub fn is_dirty(&self) -> bool {
        serialize(&self.current) != self.snapshot
    }

    pub fn get(&self, pointer: &str) -> Option<&Value> {
        self.current.pointer(pointer)
    }

    /// Replace the whole document
    pub fn replace(&mut self, content: Value) {
        self.current = content;
    }

    /// Set a value, creating a missing object key at the last step
    pub fn set(&mut self, pointer: &str, value: Value) -> Result<(), EditorError> {
        if pointer.is_empty() {
            self.current = value;
            return Ok(());
        }
        if let Some(slot) = self.current.pointer_mut(pointer) {
            *slot = value;
            return Ok(());
        }

        let (parent, token) = split_pointer(pointer)?;
        match self.current.pointer_mut(parent) {
            Some(Value::Object(map)) => {
                map.insert(token, value);
                Ok(())
            }
            Some(slot @ Value::Null) => {
                let mut map = serde_json::Map::new();
                map.insert(token, value);
                *slot = Value::Object(map);
                Ok(())
            }
            Some(_) => Err(EditorError::InvalidPointer(pointer.to_string())),
            None => Err(EditorError::NotFound(parent.to_string())),
        }
    }

    fn array_mut(&mut self, pointer: &str) -> Result<&mut Vec<Value>, EditorError> {
        match self.current.pointer_mut(pointer) {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(EditorError::NotAList(pointer.to_string())),
            None => Err(EditorError::NotFound(pointer.to_string())),
        }
    }

    /// Append to the list at `list`, creating it when the key is missing
    pub fn push(&mut self, list: &str, value: Value) -> Result<usize, EditorError> {
        if self.current.pointer(list).is_none() {
            self.set(list, Value::Array(Vec::new()))?;
        }
        let items = self.array_mut(list)?;
        items.push(value);
        Ok(items.len() - 1)
    }

    pub fn insert(&mut self, list: &str, index: usize, value: Value) -> Result<(), EditorError> {
        let items = self.array_mut(list)?;
        if index > items.len() {
            return Err(EditorError::IndexOutOfRange {
                pointer: list.to_string(),
                index,
            });
        }
        items.insert(index, value);
        Ok(())
    }

    /// Remove a list item or object key and return it
    pub fn remove(&mut self, pointer: &str) -> Result<Value, EditorError> {
        let (parent, token) = split_pointer(pointer)?;
        match self.current.pointer_mut(parent) {
            Some(Value::Array(items)) => {
                let index = parse_index(&token, pointer)?;
                if index >= items.len() {
                    return Err(EditorError::IndexOutOfRange {
                        pointer: parent.to_string(),
                        index,
                    });
                }
                Ok(items.remove(index))
            }
            Some(Value::Object(map)) => map
                .shift_remove(&token)
                .ok_or_else(|| EditorError::NotFound(pointer.to_string())),
            Some(_) => Err(EditorError::InvalidPointer(pointer.to_string())),
            None => Err(EditorError::NotFound(parent.to_string())),
        }
    }

    /// Swap a list item with its predecessor. Returns the new pointer.
    pub fn move_up(&mut self, pointer: &str) -> Result<String, EditorError> {
        self.shift(pointer, -1)
    }

    /// Swap a list item with its successor. Returns the new pointer.
    pub fn move_down(&mut self, pointer: &str) -> Result<String, EditorError> {
        self.shift(pointer, 1)
    }

    fn shift(&mut self, pointer: &str, delta: isize) -> Result<String, EditorError> {
        let (parent, token) = split_pointer(pointer)?;
        let index = parse_index(&token, pointer)?;
        let items = self.array_mut(parent)?;
        if index >= items.len() {
            return Err(EditorError::IndexOutOfRange {
                pointer: parent.to_string(),
                index,
            });
        }
        let target = index
            .checked_add_signed(delta)
            .filter(|t| *t < items.len())
            .ok_or(EditorError::IndexOutOfRange {
                pointer: parent.to_string(),
                index,
            })?;
        items.swap(index, target);
        Ok(format!("{}/{}", parent, target))
    }

    /// Take the current state as the new baseline after a successful save
    /// that produced revision `version`
    pub fn mark_saved(&mut self, version: Option<String>) {
        self.snapshot = serialize(&self.current);
        self.version = version;
    }

    /// Throw away unsaved edits
    pub fn discard(&mut self) {
        if let Ok(value) = serde_json::from_str(&self.snapshot) {
            self.current = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> EditorSession {
        EditorSession::new(
            DocumentKind::Page,
            json!({
                "hero": { "title": "Welcome" },
                "map": { "distances": [
                    { "name": "Beach", "detail": "5 min" },
                    { "name": "Airport", "detail": "40 min" },
                    { "name": "Golf", "detail": "15 min" }
                ] }
            }),
        )
    }

    #[test]
    fn test_clean_after_load() {
        assert!(!session().is_dirty());
    }

    #[test]
    fn test_edit_then_revert_is_clean() {
        let mut s = session();
        s.set("/hero/title", json!("Hello")).unwrap();
        assert!(s.is_dirty());
        s.set("/hero/title", json!("Welcome")).unwrap();
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_set_creates_missing_key() {
        let mut s = session();
        s.set("/hero/subtitle", json!("By the sea")).unwrap();
        assert_eq!(s.get("/hero/subtitle"), Some(&json!("By the sea")));
        assert!(matches!(
            s.set("/contact/email", json!("x")),
            Err(EditorError::NotFound(_))
        ));
    }

    #[test]
    fn test_move_up_and_down() {
        let mut s = session();
        let moved = s.move_down("/map/distances/0").unwrap();
        assert_eq!(moved, "/map/distances/1");
        assert_eq!(s.get("/map/distances/0/name"), Some(&json!("Airport")));
        assert_eq!(s.get("/map/distances/1/name"), Some(&json!("Beach")));
        assert!(s.is_dirty());

        s.move_up("/map/distances/1").unwrap();
        assert!(!s.is_dirty());

        assert!(s.move_up("/map/distances/0").is_err());
        assert!(s.move_down("/map/distances/2").is_err());
        assert!(s.move_down("/hero/title").is_err());
    }

    #[test]
    fn test_insert_push_remove() {
        let mut s = session();
        let idx = s
            .push("/map/distances", json!({ "name": "Town", "detail": "3 min" }))
            .unwrap();
        assert_eq!(idx, 3);
        s.insert("/map/distances", 0, json!({ "name": "Port", "detail": "1 min" }))
            .unwrap();
        assert_eq!(s.get("/map/distances/0/name"), Some(&json!("Port")));

        let removed = s.remove("/map/distances/0").unwrap();
        assert_eq!(removed["name"], "Port");
        s.remove("/map/distances/3").unwrap();
        assert!(!s.is_dirty());

        assert!(s.insert("/map/distances", 9, json!({})).is_err());
        assert!(s.remove("/map/distances/9").is_err());
        assert!(s.push("/hero/title", json!("x")).is_err());

        s.push("/marquee/items", json!("Sauna")).unwrap_err();
        s.set("/marquee", json!({})).unwrap();
        assert_eq!(s.push("/marquee/items", json!("Sauna")).unwrap(), 0);
    }

    #[test]
    fn test_remove_object_key() {
        let mut s = session();
        s.remove("/hero/title").unwrap();
        assert_eq!(s.get("/hero"), Some(&json!({})));
        assert!(s.remove("/hero/title").is_err());
    }

    #[test]
    fn test_mark_saved_and_discard() {
        let mut s = session();
        assert!(s.version().is_none());
        s.set("/hero/title", json!("Saved")).unwrap();
        s.mark_saved(Some("v2".to_string()));
        assert!(!s.is_dirty());
        assert_eq!(s.version(), Some("v2"));

        s.set("/hero/title", json!("Unsaved")).unwrap();
        s.discard();
        assert_eq!(s.get("/hero/title"), Some(&json!("Saved")));
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_discard_keeps_loaded_version() {
        let mut s = session().with_version(Some("v1".to_string()));
        s.set("/hero/title", json!("Draft")).unwrap();
        s.discard();
        assert_eq!(s.version(), Some("v1"));
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_escaped_pointer_tokens() {
        let mut s = EditorSession::new(DocumentKind::Global, json!({}));
        s.set("/a~1b", json!(1)).unwrap();
        assert_eq!(s.content(), &json!({ "a/b": 1 }));
    }
}
