//! rusty-posts/crates/rp-core/src/lib.rs
//!
//! The central domain types and interface definitions for Rusty-Posts.

pub mod models;
pub mod traits;
pub mod error;

// Re-exporting for easier access in other crates
pub use models::*;
pub use traits::*;
pub use error::*;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_json_has_no_password() {
        let user = User {
            public_id: "0b6c1c2e-4c43-4f51-9a53-1d2d1e1f9a10".to_string(),
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_new_user_ignores_client_public_id() {
        let new: NewUser = serde_json::from_value(serde_json::json!({
            "public_id": "chosen-by-client",
            "username": "alice",
            "email": "a@x.com",
            "password": "p"
        }))
        .unwrap();
        assert_eq!(new.username, "alice");
        assert!(new.validate().is_ok());
    }

    #[test]
    fn test_new_user_validation() {
        let mut new = NewUser {
            username: " ".into(),
            email: "a@x.com".into(),
            password: "p".into(),
        };
        assert!(matches!(new.validate(), Err(AppError::ValidationError(_))));

        new.username = "alice".into();
        new.email = "not-an-email".into();
        assert!(matches!(new.validate(), Err(AppError::ValidationError(_))));

        new.email = "a@x.com".into();
        new.password = String::new();
        assert!(matches!(new.validate(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_new_post_accepts_poster_alias() {
        let post: NewPost = serde_json::from_str(r#"{"title":"t","text":"x","poster":"u-1"}"#).unwrap();
        assert_eq!(post.poster_id, "u-1");

        let post: NewPost = serde_json::from_str(r#"{"title":"t","text":"x","poster_id":"u-2"}"#).unwrap();
        assert_eq!(post.poster_id, "u-2");
    }

    #[test]
    fn test_post_update_requires_title() {
        let update = PostUpdate { title: "".into(), text: "x".into() };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("Post", 999);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Post not found with ID 999");
    }
}
