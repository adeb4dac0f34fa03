pub mod filter;
pub mod task;
pub mod user;

pub use filter::{
    DateTimeFilter, FindManyArgs, IntFilter, QueryMode, SortOrder, StringFilter, TaskOrderByInput,
    TaskFindMany, TaskOrderField, TaskPriorityFilter, TaskStatusFilter, TaskWhereInput,
    UserFindMany, UserOrderByInput, UserOrderField, UserWhereInput, UuidFilter,
};
pub use task::{CreateTaskInput, Task, TaskPriority, TaskStatus, UpdateTaskInput};
pub use user::User;
