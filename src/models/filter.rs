//! ORM-style query arguments accepted by the `users` and `tasks` queries.
//!
//! The shapes follow the conventions of relational ORMs: every present field of a
//! where-input is AND-ed, `AND`/`OR`/`NOT` nest further where-inputs, and results can be
//! ordered, skipped and limited. `db::filters` compiles them into parameterised SQL.

use async_graphql::{Enum, InputObject};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::task::{TaskPriority, TaskStatus};

/// How string comparisons treat letter case.
#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum QueryMode {
    #[default]
    Default,
    Insensitive,
}

/// Filter for string columns.
#[derive(InputObject, Default, Clone, Debug)]
pub struct StringFilter {
    pub equals: Option<String>,
    pub not: Option<String>,
    /// Substring match; `%` and `_` are matched literally.
    pub contains: Option<String>,
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
    #[graphql(name = "in")]
    pub in_list: Option<Vec<String>>,
    #[graphql(default)]
    pub mode: QueryMode,
}

/// Filter for integer columns.
#[derive(InputObject, Default, Clone, Debug)]
pub struct IntFilter {
    pub equals: Option<i32>,
    pub not: Option<i32>,
    #[graphql(name = "in")]
    pub in_list: Option<Vec<i32>>,
    pub lt: Option<i32>,
    pub lte: Option<i32>,
    pub gt: Option<i32>,
    pub gte: Option<i32>,
}

/// Filter for timestamp columns.
#[derive(InputObject, Default, Clone, Debug)]
pub struct DateTimeFilter {
    pub equals: Option<DateTime<Utc>>,
    pub lt: Option<DateTime<Utc>>,
    pub lte: Option<DateTime<Utc>>,
    pub gt: Option<DateTime<Utc>>,
    pub gte: Option<DateTime<Utc>>,
}

#[derive(InputObject, Default, Clone, Debug)]
pub struct UuidFilter {
    pub equals: Option<Uuid>,
    #[graphql(name = "in")]
    pub in_list: Option<Vec<Uuid>>,
}

#[derive(InputObject, Default, Clone, Debug)]
pub struct TaskStatusFilter {
    pub equals: Option<TaskStatus>,
    pub not: Option<TaskStatus>,
    #[graphql(name = "in")]
    pub in_list: Option<Vec<TaskStatus>>,
}

#[derive(InputObject, Default, Clone, Debug)]
pub struct TaskPriorityFilter {
    pub equals: Option<TaskPriority>,
    pub not: Option<TaskPriority>,
    #[graphql(name = "in")]
    pub in_list: Option<Vec<TaskPriority>>,
}

#[derive(InputObject, Default, Clone, Debug)]
pub struct UserWhereInput {
    pub id: Option<IntFilter>,
    pub username: Option<StringFilter>,
    pub email: Option<StringFilter>,
    pub is_admin: Option<bool>,
    #[graphql(name = "AND")]
    pub and: Option<Vec<UserWhereInput>>,
    #[graphql(name = "OR")]
    pub or: Option<Vec<UserWhereInput>>,
    /// Every listed condition must be false.
    #[graphql(name = "NOT")]
    pub not: Option<Vec<UserWhereInput>>,
}

#[derive(InputObject, Default, Clone, Debug)]
pub struct TaskWhereInput {
    pub id: Option<UuidFilter>,
    pub title: Option<StringFilter>,
    pub description: Option<StringFilter>,
    pub status: Option<TaskStatusFilter>,
    pub priority: Option<TaskPriorityFilter>,
    pub due_date: Option<DateTimeFilter>,
    pub user_id: Option<IntFilter>,
    pub assigned_to: Option<IntFilter>,
    #[graphql(name = "AND")]
    pub and: Option<Vec<TaskWhereInput>>,
    #[graphql(name = "OR")]
    pub or: Option<Vec<TaskWhereInput>>,
    /// Every listed condition must be false.
    #[graphql(name = "NOT")]
    pub not: Option<Vec<TaskWhereInput>>,
}

impl TaskWhereInput {
    /// Matches the tasks owned by `user_id`.
    pub fn owned_by(user_id: i32) -> Self {
        Self {
            user_id: Some(IntFilter {
                equals: Some(user_id),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Narrows `filter` (if any) with `self`.
    pub fn restrict(self, filter: Option<TaskWhereInput>) -> Self {
        match filter {
            Some(filter) => Self {
                and: Some(vec![self, filter]),
                ..Default::default()
            },
            None => self,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum UserOrderField {
    Id,
    Username,
    Email,
    CreatedAt,
}

impl UserOrderField {
    pub fn column(self) -> &'static str {
        match self {
            UserOrderField::Id => "id",
            UserOrderField::Username => "username",
            UserOrderField::Email => "email",
            UserOrderField::CreatedAt => "created_at",
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum TaskOrderField {
    CreatedAt,
    UpdatedAt,
    DueDate,
    Title,
    Priority,
    Status,
}

impl TaskOrderField {
    pub fn column(self) -> &'static str {
        match self {
            TaskOrderField::CreatedAt => "created_at",
            TaskOrderField::UpdatedAt => "updated_at",
            TaskOrderField::DueDate => "due_date",
            TaskOrderField::Title => "title",
            TaskOrderField::Priority => "priority",
            TaskOrderField::Status => "status",
        }
    }
}

#[derive(InputObject, Clone, Copy, Debug)]
pub struct UserOrderByInput {
    pub field: UserOrderField,
    #[graphql(default)]
    pub direction: SortOrder,
}

#[derive(InputObject, Clone, Copy, Debug)]
pub struct TaskOrderByInput {
    pub field: TaskOrderField,
    #[graphql(default)]
    pub direction: SortOrder,
}

/// The arguments of a `findMany`-style query.
#[derive(Debug, Clone)]
pub struct FindManyArgs<W, O> {
    pub filter: Option<W>,
    pub order_by: Vec<O>,
    pub take: Option<i64>,
    pub skip: Option<i64>,
}

impl<W, O> Default for FindManyArgs<W, O> {
    fn default() -> Self {
        Self {
            filter: None,
            order_by: Vec::new(),
            take: None,
            skip: None,
        }
    }
}

impl<W, O> FindManyArgs<W, O> {
    pub fn new(
        filter: Option<W>,
        order_by: Option<Vec<O>>,
        take: Option<i32>,
        skip: Option<i32>,
    ) -> Self {
        Self {
            filter,
            order_by: order_by.unwrap_or_default(),
            take: take.map(i64::from),
            skip: skip.map(i64::from),
        }
    }
}

pub type UserFindMany = FindManyArgs<UserWhereInput, UserOrderByInput>;
pub type TaskFindMany = FindManyArgs<TaskWhereInput, TaskOrderByInput>;
