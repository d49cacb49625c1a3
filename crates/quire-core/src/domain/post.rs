use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Post entity - a blog post whose body is an HTML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub user_id: Option<i32>,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Apply a partial update, refreshing `updated_at`.
    pub fn apply(&mut self, changes: PostChanges, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(body) = changes.body {
            self.body = body;
        }
        self.updated_at = now;
    }
}

/// Fields required to create a post. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub user_id: Option<i32>,
    pub title: String,
    pub body: String,
}

impl NewPost {
    /// Build a new post, rejecting a blank title or body.
    pub fn new(
        user_id: Option<i32>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        let body = body.into();

        if title.trim().is_empty() || body.trim().is_empty() {
            return Err(DomainError::Validation(
                "Title and body are required".to_string(),
            ));
        }

        Ok(Self {
            user_id,
            title,
            body,
        })
    }
}

/// Partial update of a post. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl PostChanges {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }

    /// Reject supplied fields that are blank.
    pub fn validate(&self) -> Result<(), DomainError> {
        let blank = |field: &Option<String>| field.as_deref().is_some_and(|v| v.trim().is_empty());

        if blank(&self.title) {
            return Err(DomainError::Validation("Title must not be empty".to_string()));
        }
        if blank(&self.body) {
            return Err(DomainError::Validation("Body must not be empty".to_string()));
        }
        Ok(())
    }

    /// Turn the changes into a full record, if both required fields are present.
    pub fn to_new_post(&self) -> Option<NewPost> {
        match (&self.title, &self.body) {
            (Some(title), Some(body)) => NewPost::new(None, title.clone(), body.clone()).ok(),
            _ => None,
        }
    }
}

/// Parse a path segment into a post id. Only positive decimal integers are ids.
pub fn parse_post_id(raw: &str) -> Option<i32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i32>().ok().filter(|id| *id > 0)
}
