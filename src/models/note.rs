use crate::codec::{Identifier, ModelSchema, Primitive};

/// A note attached to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub text: String,
}

impl Note {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Field table: `{ "id": "...", "text": "..." }`
    pub fn schema() -> ModelSchema<Self> {
        ModelSchema::<Self>::builder("Note")
            .field("id", Identifier, |note| &note.id)
            .field("text", Primitive, |note| &note.text)
            .construct(|f| {
                Ok(Note {
                    id: f.take("id")?,
                    text: f.take("text")?,
                })
            })
    }
}
