//! Identity of the person chatting.

/// What the session provider knows about the current user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserIdentity {
    display_name: Option<String>,
}

impl UserIdentity {
    /// Creates an identity with an optional display name. Blank names are
    /// treated as absent.
    pub fn new(display_name: Option<String>) -> Self {
        let display_name = display_name.filter(|name| !name.trim().is_empty());
        Self { display_name }
    }

    /// Returns the display name, if any.
    #[inline]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the glyph shown in the user's avatar: the first character of
    /// the display name, or an empty string without one.
    pub fn avatar_glyph(&self) -> String {
        self.display_name
            .as_deref()
            .and_then(|name| name.trim_start().chars().next())
            .map(String::from)
            .unwrap_or_default()
    }
}
