//! Compiles the filter inputs of `models::filter` into SQL.
//!
//! Every value coming from a client is bound as a parameter; only column names and
//! operators chosen by this module are pushed as SQL text.

use sqlx::{Encode, Postgres, QueryBuilder, Type};

use crate::models::{
    DateTimeFilter, IntFilter, QueryMode, SortOrder, StringFilter, TaskPriorityFilter,
    TaskStatusFilter, TaskWhereInput, UserWhereInput, UuidFilter,
};

/// A where-input that can render itself as a parenthesised SQL condition.
pub trait SqlFilter {
    fn push_where<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>);
}

/// Pushes the condition for `filter`, or `TRUE` when there is none.
pub fn push_optional_where<'args, F: SqlFilter>(
    qb: &mut QueryBuilder<'args, Postgres>,
    filter: Option<&F>,
) {
    match filter {
        Some(filter) => filter.push_where(qb),
        None => {
            qb.push("TRUE");
        }
    }
}

/// Appends `ORDER BY` for the requested columns, always ending with `id ASC` so equal
/// sort keys still come back in a stable order.
pub fn push_order_by<'args>(
    qb: &mut QueryBuilder<'args, Postgres>,
    order: &[(&'static str, SortOrder)],
) {
    qb.push(" ORDER BY ");
    for (column, direction) in order {
        qb.push(*column).push(" ").push(direction.to_sql()).push(", ");
    }
    qb.push("id ASC");
}

pub fn push_limit_offset<'args>(
    qb: &mut QueryBuilder<'args, Postgres>,
    take: Option<i64>,
    skip: Option<i64>,
) {
    if let Some(take) = take {
        qb.push(" LIMIT ").push_bind(take);
    }
    if let Some(skip) = skip {
        qb.push(" OFFSET ").push_bind(skip);
    }
}

/// Escapes the LIKE metacharacters so client text is matched literally.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Joins clauses with `AND` inside one pair of parentheses; an empty conjunction is `TRUE`.
struct Conjunction<'q, 'args> {
    qb: &'q mut QueryBuilder<'args, Postgres>,
    clauses: usize,
}

impl<'q, 'args> Conjunction<'q, 'args> {
    fn begin(qb: &'q mut QueryBuilder<'args, Postgres>) -> Self {
        qb.push("(");
        Self { qb, clauses: 0 }
    }

    fn clause(&mut self) -> &mut QueryBuilder<'args, Postgres> {
        if self.clauses > 0 {
            self.qb.push(" AND ");
        }
        self.clauses += 1;
        &mut *self.qb
    }

    fn all<F: SqlFilter>(&mut self, filters: &[F]) {
        for filter in filters {
            filter.push_where(self.clause());
        }
    }

    fn any<F: SqlFilter>(&mut self, filters: &[F]) {
        let qb = self.clause();
        if filters.is_empty() {
            qb.push("FALSE");
            return;
        }
        qb.push("(");
        for (i, filter) in filters.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            filter.push_where(qb);
        }
        qb.push(")");
    }

    fn none<F: SqlFilter>(&mut self, filters: &[F]) {
        for filter in filters {
            let qb = self.clause();
            qb.push("NOT ");
            filter.push_where(qb);
        }
    }

    fn compare<T>(&mut self, column: &'static str, op: &'static str, value: T)
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send,
    {
        self.clause()
            .push(column)
            .push(" ")
            .push(op)
            .push(" ")
            .push_bind(value);
    }

    fn one_of<T>(&mut self, column: &'static str, values: &[T])
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres> + Send + Clone,
    {
        let qb = self.clause();
        if values.is_empty() {
            qb.push("FALSE");
            return;
        }
        qb.push(column).push(" IN (");
        let mut list = qb.separated(", ");
        for value in values {
            list.push_bind(value.clone());
        }
        list.push_unseparated(")");
    }

    fn finish(self) {
        if self.clauses == 0 {
            self.qb.push("TRUE");
        }
        self.qb.push(")");
    }
}

fn push_int_filter(c: &mut Conjunction<'_, '_>, column: &'static str, filter: &IntFilter) {
    if let Some(value) = filter.equals {
        c.compare(column, "=", value);
    }
    if let Some(value) = filter.not {
        c.compare(column, "<>", value);
    }
    if let Some(values) = &filter.in_list {
        c.one_of(column, values);
    }
    if let Some(value) = filter.lt {
        c.compare(column, "<", value);
    }
    if let Some(value) = filter.lte {
        c.compare(column, "<=", value);
    }
    if let Some(value) = filter.gt {
        c.compare(column, ">", value);
    }
    if let Some(value) = filter.gte {
        c.compare(column, ">=", value);
    }
}

fn push_datetime_filter(c: &mut Conjunction<'_, '_>, column: &'static str, filter: &DateTimeFilter) {
    if let Some(value) = filter.equals {
        c.compare(column, "=", value);
    }
    if let Some(value) = filter.lt {
        c.compare(column, "<", value);
    }
    if let Some(value) = filter.lte {
        c.compare(column, "<=", value);
    }
    if let Some(value) = filter.gt {
        c.compare(column, ">", value);
    }
    if let Some(value) = filter.gte {
        c.compare(column, ">=", value);
    }
}

fn push_uuid_filter(c: &mut Conjunction<'_, '_>, column: &'static str, filter: &UuidFilter) {
    if let Some(value) = filter.equals {
        c.compare(column, "=", value);
    }
    if let Some(values) = &filter.in_list {
        c.one_of(column, values);
    }
}

fn push_status_filter(c: &mut Conjunction<'_, '_>, column: &'static str, filter: &TaskStatusFilter) {
    if let Some(value) = filter.equals {
        c.compare(column, "=", value);
    }
    if let Some(value) = filter.not {
        c.compare(column, "<>", value);
    }
    if let Some(values) = &filter.in_list {
        c.one_of(column, values);
    }
}

fn push_priority_filter(
    c: &mut Conjunction<'_, '_>,
    column: &'static str,
    filter: &TaskPriorityFilter,
) {
    if let Some(value) = filter.equals {
        c.compare(column, "=", value);
    }
    if let Some(value) = filter.not {
        c.compare(column, "<>", value);
    }
    if let Some(values) = &filter.in_list {
        c.one_of(column, values);
    }
}

fn push_string_filter(c: &mut Conjunction<'_, '_>, column: &'static str, filter: &StringFilter) {
    let insensitive = filter.mode == QueryMode::Insensitive;

    if let Some(value) = &filter.equals {
        push_text_compare(c.clause(), column, "=", value.clone(), insensitive);
    }
    if let Some(value) = &filter.not {
        push_text_compare(c.clause(), column, "<>", value.clone(), insensitive);
    }
    if let Some(value) = &filter.contains {
        push_like(c.clause(), column, format!("%{}%", escape_like(value)), insensitive);
    }
    if let Some(value) = &filter.starts_with {
        push_like(c.clause(), column, format!("{}%", escape_like(value)), insensitive);
    }
    if let Some(value) = &filter.ends_with {
        push_like(c.clause(), column, format!("%{}", escape_like(value)), insensitive);
    }
    if let Some(values) = &filter.in_list {
        if insensitive {
            let qb = c.clause();
            if values.is_empty() {
                qb.push("FALSE");
            } else {
                qb.push("LOWER(").push(column).push(") IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        qb.push(", ");
                    }
                    qb.push("LOWER(").push_bind(value.clone()).push(")");
                }
                qb.push(")");
            }
        } else {
            c.one_of(column, values);
        }
    }
}

fn push_text_compare<'args>(
    qb: &mut QueryBuilder<'args, Postgres>,
    column: &'static str,
    op: &'static str,
    value: String,
    insensitive: bool,
) {
    if insensitive {
        qb.push("LOWER(")
            .push(column)
            .push(") ")
            .push(op)
            .push(" LOWER(")
            .push_bind(value)
            .push(")");
    } else {
        qb.push(column).push(" ").push(op).push(" ").push_bind(value);
    }
}

fn push_like<'args>(
    qb: &mut QueryBuilder<'args, Postgres>,
    column: &'static str,
    pattern: String,
    insensitive: bool,
) {
    qb.push(column)
        .push(if insensitive { " ILIKE " } else { " LIKE " })
        .push_bind(pattern)
        .push(" ESCAPE '\\'");
}

impl SqlFilter for UserWhereInput {
    fn push_where<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        let mut c = Conjunction::begin(qb);
        if let Some(filter) = &self.id {
            push_int_filter(&mut c, "id", filter);
        }
        if let Some(filter) = &self.username {
            push_string_filter(&mut c, "username", filter);
        }
        if let Some(filter) = &self.email {
            push_string_filter(&mut c, "email", filter);
        }
        if let Some(is_admin) = self.is_admin {
            c.compare("is_admin", "=", is_admin);
        }
        if let Some(filters) = &self.and {
            c.all(filters);
        }
        if let Some(filters) = &self.or {
            c.any(filters);
        }
        if let Some(filters) = &self.not {
            c.none(filters);
        }
        c.finish();
    }
}

impl SqlFilter for TaskWhereInput {
    fn push_where<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        let mut c = Conjunction::begin(qb);
        if let Some(filter) = &self.id {
            push_uuid_filter(&mut c, "id", filter);
        }
        if let Some(filter) = &self.title {
            push_string_filter(&mut c, "title", filter);
        }
        if let Some(filter) = &self.description {
            push_string_filter(&mut c, "description", filter);
        }
        if let Some(filter) = &self.status {
            push_status_filter(&mut c, "status", filter);
        }
        if let Some(filter) = &self.priority {
            push_priority_filter(&mut c, "priority", filter);
        }
        if let Some(filter) = &self.due_date {
            push_datetime_filter(&mut c, "due_date", filter);
        }
        if let Some(filter) = &self.user_id {
            push_int_filter(&mut c, "user_id", filter);
        }
        if let Some(filter) = &self.assigned_to {
            push_int_filter(&mut c, "assigned_to", filter);
        }
        if let Some(filters) = &self.and {
            c.all(filters);
        }
        if let Some(filters) = &self.or {
            c.any(filters);
        }
        if let Some(filters) = &self.not {
            c.none(filters);
        }
        c.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskStatus, TaskWhereInput};
    use pretty_assertions::assert_eq;

    fn render<F: SqlFilter>(filter: &F) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("");
        filter.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert_eq!(render(&TaskWhereInput::default()), "(TRUE)");
    }

    #[test]
    fn test_field_conditions_are_and_ed() {
        let filter = TaskWhereInput {
            status: Some(TaskStatusFilter {
                in_list: Some(vec![TaskStatus::Todo, TaskStatus::InProgress]),
                ..Default::default()
            }),
            user_id: Some(IntFilter {
                equals: Some(3),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(render(&filter), "(status IN ($1, $2) AND user_id = $3)");
    }

    #[test]
    fn test_nested_and_or_not() {
        let filter = UserWhereInput {
            or: Some(vec![
                UserWhereInput {
                    username: Some(StringFilter {
                        starts_with: Some("ad".into()),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                UserWhereInput {
                    is_admin: Some(true),
                    ..Default::default()
                },
            ]),
            not: Some(vec![UserWhereInput {
                id: Some(IntFilter {
                    gte: Some(100),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            ..Default::default()
        };

        assert_eq!(
            render(&filter),
            "(((username LIKE $1 ESCAPE '\\') OR (is_admin = $2)) AND NOT (id >= $3))"
        );
    }

    #[test]
    fn test_empty_or_and_empty_in_match_nothing() {
        let filter = TaskWhereInput {
            or: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(render(&filter), "(FALSE)");

        let filter = TaskWhereInput {
            assigned_to: Some(IntFilter {
                in_list: Some(vec![]),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(render(&filter), "(FALSE)");

        let filter = TaskWhereInput {
            and: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(render(&filter), "(TRUE)");
    }

    #[test]
    fn test_insensitive_string_filter() {
        let filter = TaskWhereInput {
            title: Some(StringFilter {
                equals: Some("Ship It".into()),
                contains: Some("ship".into()),
                mode: QueryMode::Insensitive,
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(
            render(&filter),
            "(LOWER(title) = LOWER($1) AND title ILIKE $2 ESCAPE '\\')"
        );
    }

    #[test]
    fn test_insensitive_in_lowers_both_sides_in_sql() {
        let filter = UserWhereInput {
            email: Some(StringFilter {
                in_list: Some(vec!["Ada@Example.com".into(), "GRACE@example.com".into()]),
                mode: QueryMode::Insensitive,
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(
            render(&filter),
            "(LOWER(email) IN (LOWER($1), LOWER($2)))"
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_order_by_and_pagination() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM tasks WHERE ");
        push_optional_where::<TaskWhereInput>(&mut qb, None);
        push_order_by(
            &mut qb,
            &[("due_date", SortOrder::Desc), ("title", SortOrder::Asc)],
        );
        push_limit_offset(&mut qb, Some(10), Some(20));

        assert_eq!(
            qb.sql(),
            "SELECT id FROM tasks WHERE TRUE ORDER BY due_date DESC, title ASC, id ASC LIMIT $1 OFFSET $2"
        );
    }
}
