use chrono::{DateTime, Utc};

/// Rejection reasons for a field assignment on [`Note`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Note ID cannot be negative.")]
    NegativeId(i64),

    #[error("Title cannot be null or empty.")]
    EmptyTitle,

    #[error("Title cannot exceed {max} characters.")]
    TitleTooLong { max: usize },

    #[error("Content cannot be null.")]
    MissingContent,

    #[error("CreatedAt timestamp cannot be null.")]
    MissingCreatedAt,
}

/// A single note. Every mutator validates before touching state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    id: i64,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl Note {
    pub const MAX_TITLE_LEN: usize = 100;

    /// Builds a transient note stamped with the current time.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        Self::check_title(&title)?;

        Ok(Self {
            id: 0,
            title,
            content: content.into(),
            created_at: Utc::now(),
        })
    }

    /// Builds a note from optional request parameters, treating absence as invalid.
    pub fn from_params(
        title: Option<String>,
        content: Option<String>,
    ) -> Result<Self, ValidationError> {
        let title = title.ok_or(ValidationError::EmptyTitle)?;
        let content = content.ok_or(ValidationError::MissingContent)?;
        Self::new(title, content)
    }

    /// Rebuilds a persisted note, running the same checks as the setters.
    pub fn restore(
        id: i64,
        title: String,
        content: String,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        let mut note = Self::new(title, content)?;
        note.set_id(id)?;
        note.set_created_at(created_at)?;
        Ok(note)
    }

    pub const fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn is_persisted(&self) -> bool {
        self.id > 0
    }

    pub const fn set_id(&mut self, id: i64) -> Result<(), ValidationError> {
        if id < 0 {
            return Err(ValidationError::NegativeId(id));
        }
        self.id = id;
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), ValidationError> {
        let title = title.into();
        Self::check_title(&title)?;
        self.title = title;
        Ok(())
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub const fn set_created_at(
        &mut self,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<(), ValidationError> {
        match created_at {
            Some(created_at) => {
                self.created_at = created_at;
                Ok(())
            }
            None => Err(ValidationError::MissingCreatedAt),
        }
    }

    fn check_title(title: &str) -> Result<(), ValidationError> {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if title.chars().count() > Self::MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong {
                max: Self::MAX_TITLE_LEN,
            });
        }
        Ok(())
    }
}
