use async_graphql::{Context, Object, Result, ResultExt};

use crate::db::Database;
use crate::models::{User, UserFindMany};

/// Query root of the plain server: lists every user, no arguments, no authorization.
pub struct BasicQuery;

#[Object(name = "Query")]
impl BasicQuery {
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let db = ctx.data::<Database>()?;
        db.users().find_many(&UserFindMany::default()).await.extend()
    }
}
