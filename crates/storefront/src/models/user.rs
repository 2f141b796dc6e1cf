//! The signed-in visitor.

use serde::{Deserialize, Serialize};

/// Identity read from the `isAuthenticated` and `userEmail` storage keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The email the visitor signed in with.
    pub email: String,
    /// Whether "remember me" was ticked.
    pub remember_me: bool,
}

impl CurrentUser {
    /// Name shown in greetings: the part of the email before `@`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.email
            .split_once('@')
            .map_or(self.email.as_str(), |(local, _)| local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let user = CurrentUser {
            email: "customer@example.com".to_string(),
            remember_me: false,
        };
        assert_eq!(user.display_name(), "customer");
    }
}
