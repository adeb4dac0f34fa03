use sqlx::{PgPool, Postgres, QueryBuilder};

use super::filters::{push_limit_offset, push_optional_where, push_order_by};
use crate::error::AppError;
use crate::models::user::USER_COLUMNS;
use crate::models::{User, UserFindMany};

pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    pub(super) fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lists users matching `args`, ordered by the requested fields and then by id.
    pub async fn find_many(&self, args: &UserFindMany) -> Result<Vec<User>, AppError> {
        let mut qb = find_many_query(args);
        let users = qb.build_query_as::<User>().fetch_all(self.pool).await?;
        Ok(users)
    }

    pub async fn find_unique(&self, id: i32) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Batch lookup used by `UserLoader`. Unknown ids are simply absent from the result.
    pub async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(ids.to_vec())
            .fetch_all(self.pool)
            .await
    }
}

fn find_many_query(args: &UserFindMany) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM users WHERE ", USER_COLUMNS));
    push_optional_where(&mut qb, args.filter.as_ref());
    let order: Vec<_> = args
        .order_by
        .iter()
        .map(|o| (o.field.column(), o.direction))
        .collect();
    push_order_by(&mut qb, &order);
    push_limit_offset(&mut qb, args.take, args.skip);
    qb
}
