use async_graphql::{Context, Object, Result, ResultExt};

use crate::db::Database;
use crate::models::{
    FindManyArgs, Task, TaskOrderByInput, TaskWhereInput, User, UserOrderByInput, UserWhereInput,
};

/// Query root that hands `where`, `orderBy`, `take` and `skip` straight to the database
/// query. There is no authorization at this stage.
pub struct PassthroughQuery;

#[Object(name = "Query")]
impl PassthroughQuery {
    async fn users(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "where")] filter: Option<UserWhereInput>,
        order_by: Option<Vec<UserOrderByInput>>,
        #[graphql(validator(minimum = 0))] take: Option<i32>,
        #[graphql(validator(minimum = 0))] skip: Option<i32>,
    ) -> Result<Vec<User>> {
        let db = ctx.data::<Database>()?;
        let args = FindManyArgs::new(filter, order_by, take, skip);
        db.users().find_many(&args).await.extend()
    }

    async fn tasks(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "where")] filter: Option<TaskWhereInput>,
        order_by: Option<Vec<TaskOrderByInput>>,
        #[graphql(validator(minimum = 0))] take: Option<i32>,
        #[graphql(validator(minimum = 0))] skip: Option<i32>,
    ) -> Result<Vec<Task>> {
        let db = ctx.data::<Database>()?;
        let args = FindManyArgs::new(filter, order_by, take, skip);
        db.tasks().find_many(&args).await.extend()
    }
}
