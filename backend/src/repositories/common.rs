//! Shared repository utilities.

use sqlx::{Postgres, QueryBuilder};

/// Appends WHERE or AND to the query builder depending on whether a clause has already been added.
pub fn push_clause(builder: &mut QueryBuilder<'_, Postgres>, has_clause: &mut bool) {
    if *has_clause {
        builder.push(" AND ");
    } else {
        builder.push(" WHERE ");
        *has_clause = true;
    }
}

/// Appends `column IN ($1, $2, ...)` binding every value.
pub fn push_in_list<'a, I>(builder: &mut QueryBuilder<'a, Postgres>, column: &str, values: I)
where
    I: IntoIterator<Item = String>,
{
    builder.push(column).push(" IN (");
    let mut separated = builder.separated(", ");
    for value in values {
        separated.push_bind(value);
    }
    separated.push_unseparated(")");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_clause_switches_to_and() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 FROM t");
        let mut has_clause = false;
        push_clause(&mut builder, &mut has_clause);
        builder.push("a = 1");
        push_clause(&mut builder, &mut has_clause);
        builder.push("b = 2");
        assert_eq!(builder.sql(), "SELECT 1 FROM t WHERE a = 1 AND b = 2");
    }

    #[test]
    fn push_in_list_binds_each_value() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 FROM t WHERE ");
        push_in_list(
            &mut builder,
            "type",
            vec!["connector".to_string(), "create_case".to_string()],
        );
        assert_eq!(builder.sql(), "SELECT 1 FROM t WHERE type IN ($1, $2)");
    }
}
