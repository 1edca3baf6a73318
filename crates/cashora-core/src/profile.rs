//! Account profiles of the two consoles
//!
//! The user's profile is read-only apart from the picture. The admin edits
//! name, email, bio and picture; the role label is fixed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::directory::looks_like_email;
use crate::error::{CoreError, CoreResult};
use crate::notice::Notice;

/// First letters of the given words, upper-cased
pub fn initials<'a>(words: impl IntoIterator<Item = &'a str>) -> String {
    words
        .into_iter()
        .filter_map(|w| w.trim().chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Refuse a blank picture reference
fn picture_reference(avatar: &str) -> CoreResult<String> {
    let avatar = avatar.trim();
    if avatar.is_empty() {
        return Err(CoreError::ValidationError {
            message: "Please choose a picture.".to_string(),
        });
    }
    Ok(avatar.to_string())
}

/// The signed-in user's own details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    /// Picture file name or link
    pub avatar: String,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Avatar fallback text
    pub fn initials(&self) -> String {
        initials([self.first_name.as_str(), self.last_name.as_str()])
    }

    /// Replace the profile picture
    pub fn set_avatar(&mut self, avatar: &str) -> CoreResult<Notice> {
        self.avatar = picture_reference(avatar)?;
        log::info!("User profile picture set to {}", self.avatar);
        Ok(Notice::new(
            "Profile Picture Updated",
            "Your profile picture has been updated successfully.",
        ))
    }
}

/// Editable part of the admin profile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminProfileDraft {
    pub name: String,
    pub email: String,
    pub bio: String,
    /// Blank keeps the current picture
    pub avatar: String,
}

/// The admin console's account details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub name: String,
    pub email: String,
    /// Shown read-only
    pub role: String,
    pub bio: String,
    pub avatar: String,
}

impl AdminProfile {
    pub fn initials(&self) -> String {
        initials(self.name.split_whitespace().take(1))
    }

    /// Save the form; nothing changes when it is refused
    pub fn update(&mut self, draft: AdminProfileDraft) -> CoreResult<Notice> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationError {
                message: "Name is required.".to_string(),
            });
        }
        if !looks_like_email(&draft.email) {
            return Err(CoreError::ValidationError {
                message: format!("'{}' is not a valid email address.", draft.email.trim()),
            });
        }
        let avatar = match draft.avatar.trim() {
            "" => self.avatar.clone(),
            other => picture_reference(other)?,
        };

        self.name = name.to_string();
        self.email = draft.email.trim().to_string();
        self.bio = draft.bio.trim().to_string();
        self.avatar = avatar;
        log::info!("Admin profile updated ({})", self.email);

        Ok(Notice::new(
            "Profile Updated",
            "Your profile has been updated successfully.",
        ))
    }
}
