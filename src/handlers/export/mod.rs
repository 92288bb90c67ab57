use serde::Serialize;

use crate::models::Note;

#[derive(Debug, Serialize)]
#[serde(rename = "notes")]
struct NotesXml {
    #[serde(rename = "note")]
    notes: Vec<NoteXml>,
}

#[derive(Debug, Serialize)]
struct NoteXml {
    id: i64,
    title: String,
    content: String,
    #[serde(rename = "createdAt")]
    created_at: String,
}

impl From<&Note> for NoteXml {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id(),
            title: note.title().to_string(),
            content: note.content().to_string(),
            created_at: note.created_at().to_rfc3339(),
        }
    }
}

/// Renders the given notes as a `<notes>` document.
pub fn notes_to_xml(notes: &[Note]) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let document = NotesXml {
        notes: notes.iter().map(NoteXml::from).collect(),
    };

    let body = quick_xml::se::to_string(&document)?;
    Ok(format!(r#"<?xml version="1.0" encoding="UTF-8"?>{body}"#))
}
