use serde::{Deserialize, Serialize};

/// Signed-in identity, as handed over by the auth backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Who is using the app and how it should look.
///
/// Built once at startup and passed to whatever needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub theme: Theme,
}

impl Session {
    pub fn new(user: Option<UserProfile>, theme: Theme) -> Self {
        Self { user, theme }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Name for the header greeting
    pub fn display_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.full_name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or("Guest")
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}
