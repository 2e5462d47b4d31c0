//! PostgreSQL rendering of composed queries
//!
//! [`SqlCompiler`] turns a [`Query`] into parameterized SQL with `$n`
//! placeholders. Nested paths such as `employer.address.city` are rendered
//! against a join alias built from the object hops (`"employer__address"."city"`);
//! the aliases a statement needs are listed in [`SqlStatement::joins`] so
//! the caller can add the matching `JOIN` clauses.

use std::collections::BTreeSet;

use crate::core::{FieldPath, FieldValue, Predicate, Query, SortDirection};

/// Rendered SQL with its bind values, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<FieldValue>,
    pub joins: BTreeSet<String>,
}

/// Compiler for one table
#[derive(Debug, Clone)]
pub struct SqlCompiler {
    table: String,
}

impl SqlCompiler {
    pub fn new(table: impl Into<String>) -> Self {
        Self { table: table.into() }
    }

    /// `SELECT *` with filtering, ordering and paging
    pub fn compile_select(&self, query: &Query) -> SqlStatement {
        let mut builder = Builder::default();
        let mut sql = format!("SELECT * FROM {}", quote_identifier(&self.table));

        builder.append_where(&mut sql, &query.predicate());

        if !query.ordering().is_empty() {
            let clauses: Vec<String> = query
                .ordering()
                .iter()
                .map(|clause| {
                    let column = builder.column(&clause.path);
                    match clause.direction {
                        SortDirection::Ascending => format!("{column} ASC"),
                        SortDirection::Descending => format!("{column} DESC"),
                    }
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&clauses.join(", "));
        }

        if let Some(take) = query.take_count() {
            let placeholder = builder.bind(FieldValue::Integer(i64::try_from(take).unwrap_or(i64::MAX)));
            sql.push_str(&format!(" LIMIT {placeholder}"));
        }
        if let Some(skip) = query.skip_count() {
            let placeholder = builder.bind(FieldValue::Integer(i64::try_from(skip).unwrap_or(i64::MAX)));
            sql.push_str(&format!(" OFFSET {placeholder}"));
        }

        builder.finish(sql)
    }

    /// `SELECT COUNT(*)` over the filtered rows
    pub fn compile_count(&self, query: &Query) -> SqlStatement {
        let mut builder = Builder::default();
        let mut sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(&self.table));
        builder.append_where(&mut sql, &query.predicate());
        builder.finish(sql)
    }
}

#[derive(Default)]
struct Builder {
    params: Vec<FieldValue>,
    joins: BTreeSet<String>,
}

impl Builder {
    fn bind(&mut self, value: FieldValue) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn column(&mut self, path: &FieldPath) -> String {
        match path.segments().split_last() {
            Some((column, [])) => quote_identifier(column),
            Some((column, hops)) => {
                let alias = hops.join("__");
                let rendered = format!("{}.{}", quote_identifier(&alias), quote_identifier(column));
                self.joins.insert(alias);
                rendered
            }
            None => "NULL".to_string(),
        }
    }

    fn append_where(&mut self, sql: &mut String, predicate: &Predicate) {
        if *predicate == Predicate::Always {
            return;
        }
        let condition = self.render(predicate);
        sql.push_str(" WHERE ");
        sql.push_str(&condition);
    }

    fn render(&mut self, predicate: &Predicate) -> String {
        match predicate {
            Predicate::Always => "TRUE".to_string(),
            Predicate::Never => "FALSE".to_string(),
            Predicate::IsNull(path) => format!("{} IS NULL", self.column(path)),
            Predicate::Equals(path, value) => {
                let column = self.column(path);
                let placeholder = self.bind(value.clone());
                format!("{column} = {placeholder}")
            }
            Predicate::In(path, values) => {
                if values.is_empty() {
                    return "FALSE".to_string();
                }
                let column = self.column(path);
                let placeholders: Vec<String> = values.iter().map(|v| self.bind(v.clone())).collect();
                format!("{column} IN ({})", placeholders.join(", "))
            }
            Predicate::Range { path, start, end } => {
                let column = self.column(path);
                let lower = self.bind(start.clone());
                let upper = self.bind(end.clone());
                format!("({column} >= {lower} AND {column} < {upper})")
            }
            Predicate::StartsWith { path, value } => {
                let column = self.column(path);
                let placeholder = self.bind(FieldValue::String(format!("{}%", escape_like(value))));
                format!("{column} ILIKE {placeholder} ESCAPE '\\'")
            }
            Predicate::Contains { path, value } => {
                let column = self.column(path);
                let placeholder = self.bind(FieldValue::String(format!("%{}%", escape_like(value))));
                format!("{column} ILIKE {placeholder} ESCAPE '\\'")
            }
            Predicate::And(children) => self.group(children, " AND ", "TRUE"),
            Predicate::Or(children) => self.group(children, " OR ", "FALSE"),
        }
    }

    fn group(&mut self, children: &[Predicate], separator: &str, empty: &str) -> String {
        if children.is_empty() {
            return empty.to_string();
        }
        let parts: Vec<String> = children.iter().map(|c| self.render(c)).collect();
        format!("({})", parts.join(separator))
    }

    fn finish(self, sql: String) -> SqlStatement {
        SqlStatement {
            sql,
            params: self.params,
            joins: self.joins,
        }
    }
}

fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
