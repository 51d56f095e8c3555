//! Chat message with a lazily loaded author and nested comments

use uuid::Uuid;

use crate::codec::{CodecResult, DeferredSchema, Identifier, List, ModelSchema, Primitive};
use crate::config::CodecConfig;
use crate::loadable::Loadable;

/// Message author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: Uuid,
    pub display_name: String,
}

impl Author {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
        }
    }

    pub fn schema() -> ModelSchema<Self> {
        ModelSchema::<Self>::builder("Author")
            .field("id", Identifier, |author| &author.id)
            .field("displayName", Primitive, |author| &author.display_name)
            .construct(|f| {
                Ok(Author {
                    id: f.take("id")?,
                    display_name: f.take("displayName")?,
                })
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message: String,
    pub author: Loadable<Author>,
    /// Replies, encoded with this same schema
    pub comments: Vec<Message>,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            author: Loadable::NotStarted,
            comments: Vec::new(),
        }
    }

    pub fn with_comment(mut self, comment: Message) -> Self {
        self.comments.push(comment);
        self
    }

    pub fn schema(config: &CodecConfig) -> CodecResult<ModelSchema<Self>> {
        let author = Loadable::field_with_config(Author::schema(), config.clone())?;
        let nested = config.clone();
        let comments = List(DeferredSchema::new(move || Message::schema(&nested)));

        Ok(ModelSchema::<Self>::builder("Message")
            .field("message", Primitive, |message| &message.message)
            .field("author", author, |message| &message.author)
            .optional_field("comments", comments, |message| Some(&message.comments))
            .construct(|f| {
                Ok(Message {
                    message: f.take("message")?,
                    author: f.take("author")?,
                    comments: f.take::<Option<Vec<Message>>>("comments")?.unwrap_or_default(),
                })
            }))
    }
}
