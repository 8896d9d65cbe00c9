//! User model for storage and API.

use serde::{Deserialize, Serialize};

fn default_roles() -> Vec<String> {
    vec!["user".to_string()]
}

/// User account stored in Firestore.
///
/// `password_hash` never leaves the server; API responses use
/// [`UserResponse`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Document ID (uuid v4)
    pub id: String,
    /// Unique display name used for login
    pub username: String,
    /// Unique email address
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Optional profile text
    pub bio: Option<String>,
    /// Role tags (user, admin, moderator)
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
    /// Place ids this user has liked, in like order
    #[serde(default)]
    pub favorite_places: Vec<String>,
    /// When the account was created (RFC 3339)
    pub created_at: String,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String, bio: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            email,
            password_hash,
            bio,
            roles: default_roles(),
            favorite_places: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Record a like. Returns false if the place is already a favorite,
    /// in which case nothing changes.
    pub fn add_favorite(&mut self, place_id: &str) -> bool {
        if self.favorite_places.iter().any(|p| p == place_id) {
            return false;
        }
        self.favorite_places.push(place_id.to_string());
        true
    }

    /// Remove a like. Returns false if the place was not a favorite.
    pub fn remove_favorite(&mut self, place_id: &str) -> bool {
        let before = self.favorite_places.len();
        self.favorite_places.retain(|p| p != place_id);
        self.favorite_places.len() != before
    }
}

/// Public view of a user, with the password hash stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub roles: Vec<String>,
    pub favorite_places: Vec<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            bio: user.bio,
            roles: user.roles,
            favorite_places: user.favorite_places,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new(
            "explorer".to_string(),
            "explorer@example.com".to_string(),
            "$2b$12$hash".to_string(),
            None,
        )
    }

    #[test]
    fn test_add_favorite() {
        let mut user = test_user();

        assert!(user.add_favorite("place-1"));
        assert_eq!(user.favorite_places, vec!["place-1"]);

        // Second like of the same place is rejected without duplicating
        assert!(!user.add_favorite("place-1"));
        assert_eq!(user.favorite_places, vec!["place-1"]);
    }

    #[test]
    fn test_remove_favorite() {
        let mut user = test_user();
        user.add_favorite("place-1");
        user.add_favorite("place-2");

        assert!(user.remove_favorite("place-1"));
        assert_eq!(user.favorite_places, vec!["place-2"]);

        // Removing a place that was never liked reports failure
        assert!(!user.remove_favorite("place-1"));
        assert_eq!(user.favorite_places, vec!["place-2"]);
    }

    #[test]
    fn test_new_user_defaults() {
        let user = test_user();

        assert_eq!(user.roles, vec!["user"]);
        assert!(user.favorite_places.is_empty());
        assert!(!user.id.is_empty());
    }

    #[test]
    fn test_response_strips_password_hash() {
        let user = test_user();
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "explorer");
    }
}
