use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user as stored in the `users` table.
///
/// Exposed as is by the plain and passthrough schemas; the full schema wraps it in
/// `graphql::relations::UserNode` to add relation fields.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Columns selected whenever a full `User` row is read.
pub(crate) const USER_COLUMNS: &str = "id, username, email, is_admin, created_at";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serializes_snake_case_columns() {
        let user = User {
            id: 7,
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            is_admin: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["is_admin"], false);
        for column in USER_COLUMNS.split(", ") {
            assert!(json.get(column).is_some(), "missing column {}", column);
        }
    }
}
