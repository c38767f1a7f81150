use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase categories that keep their own set of takes per slide
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[default]
    Draft,
    CommunityCheck,
    Dramatization,
    BackTranslation,
}

impl Category {
    /// Stable identifier used in storage paths, selection keys and the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Draft => "draft",
            Category::CommunityCheck => "community-check",
            Category::Dramatization => "dramatization",
            Category::BackTranslation => "back-translation",
        }
    }

    /// List all categories
    pub fn all() -> &'static [Category] {
        &[
            Category::Draft,
            Category::CommunityCheck,
            Category::Dramatization,
            Category::BackTranslation,
        ]
    }

    /// Human-readable display name for this category
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Draft => "Draft",
            Category::CommunityCheck => "Community Check",
            Category::Dramatization => "Dramatization",
            Category::BackTranslation => "Back Translation",
        }
    }

    /// Prefix for automatically named takes ("Draft 1", "Comment 2", ...)
    pub fn default_take_prefix(&self) -> &'static str {
        match self {
            Category::Draft => "Draft",
            Category::CommunityCheck => "Comment",
            Category::Dramatization => "Dramatization",
            Category::BackTranslation => "Back Translation",
        }
    }

    /// Title and message shown before a take of this category is deleted
    pub fn delete_prompt(&self) -> (&'static str, &'static str) {
        match self {
            Category::Draft => ("Delete draft?", "Do you want to delete this draft recording?"),
            Category::CommunityCheck => (
                "Delete comment?",
                "Do you want to delete this community comment?",
            ),
            Category::Dramatization => (
                "Delete dramatization?",
                "Do you want to delete this dramatization recording?",
            ),
            Category::BackTranslation => (
                "Delete back translation?",
                "Do you want to delete this back translation recording?",
            ),
        }
    }

    /// Whether takes of this category are picked from a list (one is "the" take)
    pub fn is_selectable(&self) -> bool {
        !matches!(self, Category::CommunityCheck)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" | "translate" => Ok(Category::Draft),
            "community-check" | "communitycheck" | "community" | "comment" => {
                Ok(Category::CommunityCheck)
            }
            "dramatization" | "drama" => Ok(Category::Dramatization),
            "back-translation" | "backtranslation" | "backt" => Ok(Category::BackTranslation),
            _ => Err(format!(
                "Unknown category: {}. Available: draft, community-check, dramatization, back-translation",
                s
            )),
        }
    }
}
