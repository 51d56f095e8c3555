//! User model
//!
//! `note` and `noteUpdate` are always written. When absent on input they
//! decode to `NotStarted`, so a bare `{ "name", "email" }` object is a
//! valid user.

use std::sync::Arc;

use super::email::UserEmail;
use super::note::Note;
use crate::codec::{CodecResult, ModelSchema, Primitive, UnionField};
use crate::config::CodecConfig;
use crate::loadable::{Loadable, LoadableUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub email: UserEmail,
    pub note: Loadable<Note>,
    pub note_update: LoadableUpdate,
}

impl User {
    pub fn new(name: impl Into<String>, email: UserEmail) -> Self {
        Self {
            name: name.into(),
            email,
            note: Loadable::NotStarted,
            note_update: LoadableUpdate::NotStarted,
        }
    }

    /// Field table. Every nested union uses the tag field of `config`.
    pub fn schema(config: &CodecConfig) -> CodecResult<ModelSchema<Self>> {
        let email = UnionField::new(Arc::new(UserEmail::registry(config.clone())?));
        let note = Loadable::field_with_config(Note::schema(), config.clone())?;
        let note_update = LoadableUpdate::field_with_config(config.clone())?;

        Ok(ModelSchema::<Self>::builder("User")
            .field("name", Primitive, |user| &user.name)
            .field("email", email, |user| &user.email)
            .optional_field("note", note, |user| Some(&user.note))
            .optional_field("noteUpdate", note_update, |user| Some(&user.note_update))
            .construct(|f| {
                Ok(User {
                    name: f.take("name")?,
                    email: f.take("email")?,
                    note: f.take::<Option<Loadable<Note>>>("note")?.unwrap_or_default(),
                    note_update: f
                        .take::<Option<LoadableUpdate>>("noteUpdate")?
                        .unwrap_or_default(),
                })
            }))
    }
}
