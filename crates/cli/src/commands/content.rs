use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;
use villa_site_core::DocumentKind;
use villa_site_editor::{AdminClient, Editor, EditorSession};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

const TIMEOUT: Duration = Duration::from_secs(30);

/// One edit applied through an editor session
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Set { pointer: String, value: Value },
    MoveUp { pointer: String },
    MoveDown { pointer: String },
    Remove { pointer: String },
}

impl Edit {
    fn apply(&self, session: &mut EditorSession) -> Result<()> {
        match self {
            Edit::Set { pointer, value } => session.set(pointer, value.clone())?,
            Edit::MoveUp { pointer } => {
                session.move_up(pointer)?;
            }
            Edit::MoveDown { pointer } => {
                session.move_down(pointer)?;
            }
            Edit::Remove { pointer } => {
                session.remove(pointer)?;
            }
        }
        Ok(())
    }
}

/// Values are JSON when they parse as JSON, plain strings otherwise
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub async fn get(server: &str, kind: DocumentKind, pointer: Option<&str>) -> Result<()> {
    let client = AdminClient::new(server, TIMEOUT)?;
    let content = client
        .get_content(kind)
        .await
        .with_context(|| format!("Failed to load {} content", kind))?
        .content;

    let value = match pointer {
        Some(pointer) => content
            .pointer(pointer)
            .with_context(|| format!("Nothing at {}", pointer))?,
        None => &content,
    };
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn apply(
    server: &str,
    password: Option<String>,
    kind: DocumentKind,
    edit: Edit,
) -> Result<()> {
    let password = password
        .or_else(|| std::env::var("ADMIN_PASSWORD").ok())
        .unwrap_or_default();

    let mut editor = Editor::new(AdminClient::new(server, TIMEOUT)?);
    editor.sign_in(&password).await.context("Sign in failed")?;

    let session = editor
        .open(kind)
        .await
        .with_context(|| format!("Failed to load {} content", kind))?;
    edit.apply(session)?;

    if !session.is_dirty() {
        println!("No change");
        return Ok(());
    }

    let message = editor.save(kind).await.context("Save failed")?;
    println!("✓ {}", message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("[\"a\", \"b\"]"), json!(["a", "b"]));
        assert_eq!(parse_value("Welcome home"), json!("Welcome home"));
        assert_eq!(parse_value("\"quoted\""), json!("quoted"));
    }

    #[test]
    fn test_edit_apply() {
        let mut session = EditorSession::new(
            DocumentKind::Page,
            json!({ "marquee": { "items": ["Sea", "Sun", "Sand"] } }),
        );
        Edit::MoveDown {
            pointer: "/marquee/items/0".to_string(),
        }
        .apply(&mut session)
        .unwrap();
        Edit::Remove {
            pointer: "/marquee/items/2".to_string(),
        }
        .apply(&mut session)
        .unwrap();
        Edit::Set {
            pointer: "/marquee/items/0".to_string(),
            value: json!("Sky"),
        }
        .apply(&mut session)
        .unwrap();
        assert_eq!(session.content(), &json!({ "marquee": { "items": ["Sky", "Sea"] } }));
    }
}
