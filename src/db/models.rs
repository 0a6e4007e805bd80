use chrono::{DateTime, Utc};

pub const NAME_MAX_LEN: usize = 50;
pub const IMAGE_URL_MAX_LEN: usize = 1000;
pub const TITLE_MAX_LEN: usize = 50;

/// Shown for users who never set an avatar.
pub const DEFAULT_IMAGE_URL: &str = "/assets/img/default-avatar.svg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub image_url: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn avatar_url(&self) -> &str {
        self.image_url.as_deref().unwrap_or(DEFAULT_IMAGE_URL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
}

impl Post {
    /// Human-friendly timestamp, e.g. "Mar 4, 2024, 9:05 PM".
    pub fn created_display(&self) -> String {
        self.created_at.format("%b %-d, %Y, %-I:%M %p").to_string()
    }
}

/// Fields accepted when creating or editing a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInput {
    pub first_name: String,
    pub last_name: String,
    pub image_url: Option<String>,
}

/// Fields accepted when creating or editing a post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostInput {
    pub title: String,
    pub content: String,
}

impl UserInput {
    /// Trim and check the fields, returning the normalized input.
    /// A blank image URL is treated as absent.
    pub fn validate(self) -> Result<Self, String> {
        let first_name = required("First name", &self.first_name, Some(NAME_MAX_LEN))?;
        let last_name = required("Last name", &self.last_name, Some(NAME_MAX_LEN))?;

        let image_url = match self.image_url.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(url) if url.chars().count() > IMAGE_URL_MAX_LEN => {
                return Err(format!(
                    "Image URL must be {} characters or less",
                    IMAGE_URL_MAX_LEN
                ));
            }
            Some(url) => Some(url.to_string()),
        };

        Ok(Self {
            first_name,
            last_name,
            image_url,
        })
    }
}

impl PostInput {
    /// The title is trimmed; the body is stored exactly as written.
    pub fn validate(self) -> Result<Self, String> {
        let title = required("Title", &self.title, Some(TITLE_MAX_LEN))?;
        if self.content.trim().is_empty() {
            return Err("Content is required".to_string());
        }
        Ok(Self {
            title,
            content: self.content,
        })
    }
}

fn required(label: &str, value: &str, max_len: Option<usize>) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{} is required", label));
    }
    if let Some(max) = max_len {
        if value.chars().count() > max {
            return Err(format!("{} must be {} characters or less", label, max));
        }
    }
    Ok(value.to_string())
}
