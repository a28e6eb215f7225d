//! Field checks shared by create, update, tag and import paths

use crate::config::NoteLimits;
use crate::error::{StoreError, StoreResult};
use crate::models::dedup_tags;

impl NoteLimits {
    /// Title must be non-blank and within `max_title_length` characters
    pub fn check_title(&self, title: &str) -> StoreResult<()> {
        if title.trim().is_empty() {
            return Err(StoreError::Validation("title must not be empty".into()));
        }
        let len = title.chars().count();
        if len > self.max_title_length {
            return Err(StoreError::Validation(format!(
                "title is {} characters; the maximum is {}",
                len, self.max_title_length
            )));
        }
        Ok(())
    }

    pub fn check_content(&self, content: &str) -> StoreResult<()> {
        let len = content.chars().count();
        if len > self.max_content_length {
            return Err(StoreError::Validation(format!(
                "content is {} characters; the maximum is {}",
                len, self.max_content_length
            )));
        }
        Ok(())
    }

    pub fn check_tag(&self, tag: &str) -> StoreResult<()> {
        if tag.trim().is_empty() {
            return Err(StoreError::Validation("tags must not be empty".into()));
        }
        Ok(())
    }

    /// Validate a full tag list, returning it without duplicates
    pub fn normalize_tags(&self, tags: Vec<String>) -> StoreResult<Vec<String>> {
        for tag in &tags {
            self.check_tag(tag)?;
        }
        let tags = dedup_tags(tags);
        self.check_tag_count(tags.len())?;
        Ok(tags)
    }

    pub fn check_tag_count(&self, count: usize) -> StoreResult<()> {
        if count > self.max_tags {
            return Err(StoreError::Validation(format!(
                "a note can have at most {} tags (got {})",
                self.max_tags, count
            )));
        }
        Ok(())
    }
}
