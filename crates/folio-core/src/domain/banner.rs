//! Banner entity.

use crate::validation::rules::{non_blank, not_blank, web_url};
use crate::{BannerId, FolioError, FolioResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Homepage banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    pub banner_image: Option<String>,
    pub action: Option<BannerAction>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Banner {
    /// Builds a new banner from validated input.
    #[must_use]
    pub fn new(input: NewBanner) -> Self {
        let now = Utc::now();
        Self {
            id: BannerId::new(),
            title: input.title.trim().to_string(),
            banner_image: non_blank(input.banner_image),
            action: input.action.and_then(BannerAction::normalized),
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update and bumps `updated_at`.
    pub fn apply(&mut self, patch: &BannerPatch) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(banner_image) = &patch.banner_image {
            self.banner_image = non_blank(banner_image.clone());
        }
        if let Some(action) = &patch.action {
            self.action = action.clone().and_then(BannerAction::normalized);
        }
        if let Some(archived) = patch.archived {
            self.archived = archived;
        }
        self.updated_at = Utc::now();
    }
}

/// Call-to-action rendered on a banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BannerAction {
    pub action_text: Option<String>,

    #[validate(custom(function = "web_url"))]
    pub action_url: Option<String>,

    #[serde(default)]
    pub is_external: bool,
}

impl BannerAction {
    /// Drops an action that has neither text nor URL.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let text = non_blank(self.action_text);
        let url = non_blank(self.action_url);
        if text.is_none() && url.is_none() {
            return None;
        }
        Some(Self {
            action_text: text,
            action_url: url,
            is_external: self.is_external,
        })
    }

    /// A URL without a label cannot be rendered.
    pub fn check_complete(&self) -> FolioResult<()> {
        let has_url = self.action_url.as_deref().is_some_and(|u| !u.trim().is_empty());
        let has_text = self.action_text.as_deref().is_some_and(|t| !t.trim().is_empty());
        if has_url && !has_text {
            return Err(FolioError::validation(
                "Action text is required when URL is provided",
            ));
        }
        Ok(())
    }
}

/// Input for creating a banner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewBanner {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub title: String,

    pub banner_image: Option<String>,

    #[validate(nested)]
    pub action: Option<BannerAction>,
}

impl NewBanner {
    /// Trims the image and action fields ahead of validation.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            banner_image: non_blank(self.banner_image),
            action: self.action.and_then(BannerAction::normalized),
            ..self
        }
    }
}

/// Partial update of a banner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct BannerPatch {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub title: Option<String>,

    pub banner_image: Option<Option<String>>,

    pub action: Option<Option<BannerAction>>,

    pub archived: Option<bool>,
}

impl BannerPatch {
    /// Patch that only flips the archived flag.
    #[must_use]
    pub fn archived(archived: bool) -> Self {
        Self {
            archived: Some(archived),
            ..Self::default()
        }
    }

    /// Trims the image and action fields ahead of validation. Blank values
    /// clear the stored ones.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            banner_image: self.banner_image.map(non_blank),
            action: self.action.map(|action| action.and_then(BannerAction::normalized)),
            ..self
        }
    }

    /// Checks whether the patch carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.banner_image.is_none()
            && self.action.is_none()
            && self.archived.is_none()
    }
}
