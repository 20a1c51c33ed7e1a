// SPDX-License-Identifier: Apache-2.0

//! SQLite adapter: cards stored as JSON documents, plans compiled to SQL.
//!
//! The WHERE clause and its parameters are built once per plan and shared by
//! the `COUNT(*)` and the windowed `SELECT`.

use crate::executor::{DataSource, ExecError};
use crate::planner::{Combinator, Condition, OrderTerm, Predicate, QueryPlan, SortDirection};
use crate::text::{escape_like, fold_text, real_text};
use cardex_model::{Card, CardId, Page};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection};
use std::path::Path;

pub const FOLD_FUNCTION: &str = "cardex_fold";

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS cards (
    card_id TEXT PRIMARY KEY NOT NULL,
    doc TEXT NOT NULL
)";

fn json_path(field: &str) -> String {
    format!("$.\"{field}\"")
}

fn push_path(params: &mut Vec<Value>, field: &str) {
    params.push(Value::Text(json_path(field)));
}

fn condition_sql(condition: &Condition, params: &mut Vec<Value>) -> String {
    match condition {
        Condition::TextContains { field, needle } | Condition::TextNotContains { field, needle } => {
            push_path(params, field);
            params.push(Value::Text(format!("%{}%", escape_like(needle))));
            let op = if matches!(condition, Condition::TextContains { .. }) {
                "LIKE"
            } else {
                "NOT LIKE"
            };
            format!("COALESCE({FOLD_FUNCTION}(json_extract(c.doc, ?)), '') {op} ? ESCAPE '!'")
        }
        Condition::ArrayContains { field, value } | Condition::ArrayNotContains { field, value } => {
            push_path(params, field);
            params.push(Value::Text(value.clone()));
            let exists = "EXISTS (SELECT 1 FROM json_each(c.doc, ?) e WHERE e.type = 'text' AND e.value = ?)";
            if matches!(condition, Condition::ArrayContains { .. }) {
                exists.to_string()
            } else {
                format!("NOT {exists}")
            }
        }
        Condition::ArrayEmpty { field } | Condition::ArrayNotEmpty { field } => {
            push_path(params, field);
            let exists = "EXISTS (SELECT 1 FROM json_each(c.doc, ?) e WHERE e.type != 'null')";
            if matches!(condition, Condition::ArrayNotEmpty { .. }) {
                exists.to_string()
            } else {
                format!("NOT {exists}")
            }
        }
        Condition::NumberRange { field, min, max } => {
            push_path(params, field);
            let mut parts = vec!["json_type(c.doc, ?) IN ('integer', 'real')".to_string()];
            if let Some(lo) = min {
                push_path(params, field);
                params.push(Value::Integer(*lo));
                parts.push("json_extract(c.doc, ?) >= ?".to_string());
            }
            if let Some(hi) = max {
                push_path(params, field);
                params.push(Value::Integer(*hi));
                parts.push("json_extract(c.doc, ?) <= ?".to_string());
            }
            format!("({})", parts.join(" AND "))
        }
        Condition::IsNull { field } => {
            push_path(params, field);
            "COALESCE(json_type(c.doc, ?), 'null') = 'null'".to_string()
        }
        Condition::IsTrue { field } => {
            push_path(params, field);
            push_path(params, field);
            "(json_type(c.doc, ?) IN ('true', 'integer', 'real') AND json_extract(c.doc, ?) = 1)"
                .to_string()
        }
    }
}

fn predicate_sql(predicate: &Predicate, params: &mut Vec<Value>) -> String {
    let joiner = match predicate.combinator {
        Combinator::And => " AND ",
        Combinator::Or => " OR ",
    };
    let parts: Vec<String> = predicate
        .conditions
        .iter()
        .map(|c| condition_sql(c, params))
        .collect();
    if parts.is_empty() {
        return "1".to_string();
    }
    format!("({})", parts.join(joiner))
}

/// WHERE clause (empty when the plan has no predicates) and its parameters.
#[must_use]
pub fn build_where(plan: &QueryPlan) -> (String, Vec<Value>) {
    let mut params: Vec<Value> = Vec::new();
    let where_parts: Vec<String> = plan
        .predicates
        .iter()
        .map(|p| predicate_sql(p, &mut params))
        .collect();
    if where_parts.is_empty() {
        return (String::new(), params);
    }
    (format!(" WHERE {}", where_parts.join(" AND ")), params)
}

fn order_sql(order: &[OrderTerm], params: &mut Vec<Value>) -> String {
    let mut terms: Vec<String> = Vec::new();
    for term in order {
        let dir = match term.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        if term.field == "card_id" {
            terms.push(format!("c.card_id {dir}"));
            continue;
        }
        push_path(params, &term.field);
        push_path(params, &term.field);
        terms.push(format!(
            "(json_extract(c.doc, ?) IS NULL) ASC, json_extract(c.doc, ?) {dir}"
        ));
    }
    if !order.iter().any(|t| t.field == "card_id") {
        terms.push("c.card_id ASC".to_string());
    }
    format!(" ORDER BY {}", terms.join(", "))
}

pub fn build_sql(plan: &QueryPlan) -> (String, Vec<Value>) {
    let (where_sql, mut params) = build_where(plan);
    let mut sql = format!("SELECT c.card_id, c.doc FROM cards c{where_sql}");
    sql.push_str(&order_sql(&plan.order, &mut params));
    sql.push_str(" LIMIT ? OFFSET ?");
    params.push(Value::Integer(plan.window.limit as i64));
    params.push(Value::Integer(plan.window.offset as i64));
    (sql, params)
}

pub fn build_count_sql(plan: &QueryPlan) -> (String, Vec<Value>) {
    let (where_sql, params) = build_where(plan);
    (format!("SELECT COUNT(*) FROM cards c{where_sql}"), params)
}

pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let folded = match ctx.get_raw(0) {
                ValueRef::Null => None,
                ValueRef::Integer(i) => Some(i.to_string()),
                ValueRef::Real(r) => Some(real_text(r)),
                ValueRef::Text(t) | ValueRef::Blob(t) => {
                    Some(fold_text(&String::from_utf8_lossy(t)))
                }
            };
            Ok(folded)
        },
    )
}

fn decode_row(card_id: &str, doc: &str) -> Result<Card, ExecError> {
    let id = CardId::parse(card_id).map_err(|e| ExecError::Validation(e.to_string()))?;
    let attributes: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(doc).map_err(|e| ExecError::Validation(e.to_string()))?;
    Ok(Card::new(id, attributes))
}

pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> rusqlite::Result<Self> {
        register_functions(&conn)?;
        let catalog = Self { conn };
        catalog.init_schema()?;
        Ok(catalog)
    }

    pub fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(SCHEMA_SQL)
    }

    pub fn insert_card(&self, card: &Card) -> Result<(), ExecError> {
        let doc = serde_json::to_string(&card.attributes)
            .map_err(|e| ExecError::Validation(e.to_string()))?;
        self.conn
            .prepare_cached("INSERT OR REPLACE INTO cards (card_id, doc) VALUES (?1, ?2)")
            .and_then(|mut stmt| stmt.execute([card.card_id.as_str(), doc.as_str()]))
            .map_err(|e| ExecError::Sql(e.to_string()))?;
        Ok(())
    }

    pub fn insert_cards<'a>(
        &mut self,
        cards: impl IntoIterator<Item = &'a Card>,
    ) -> Result<usize, ExecError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| ExecError::Sql(e.to_string()))?;
        let mut count = 0;
        {
            let mut stmt = tx
                .prepare_cached("INSERT OR REPLACE INTO cards (card_id, doc) VALUES (?1, ?2)")
                .map_err(|e| ExecError::Sql(e.to_string()))?;
            for card in cards {
                let doc = serde_json::to_string(&card.attributes)
                    .map_err(|e| ExecError::Validation(e.to_string()))?;
                stmt.execute([card.card_id.as_str(), doc.as_str()])
                    .map_err(|e| ExecError::Sql(e.to_string()))?;
                count += 1;
            }
        }
        tx.commit().map_err(|e| ExecError::Sql(e.to_string()))?;
        Ok(count)
    }

    fn count(&self, plan: &QueryPlan) -> Result<u64, ExecError> {
        let (sql, params) = build_count_sql(plan);
        let mut stmt = self
            .conn
            .prepare_cached(&sql)
            .map_err(|e| ExecError::Sql(e.to_string()))?;
        let total: i64 = stmt
            .query_row(params_from_iter(params.iter()), |row| row.get(0))
            .map_err(|e| ExecError::Sql(e.to_string()))?;
        Ok(u64::try_from(total).unwrap_or(0))
    }
}

impl DataSource for SqliteCatalog {
    fn execute(&self, plan: &QueryPlan) -> Result<Page, ExecError> {
        let total = self.count(plan)?;
        let (sql, params) = build_sql(plan);
        let mut stmt = self
            .conn
            .prepare_cached(&sql)
            .map_err(|e| ExecError::Sql(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| ExecError::Sql(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ExecError::Sql(e.to_string()))?;
        let items = rows
            .iter()
            .map(|(id, doc)| decode_row(id, doc))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page { items, total })
    }
}
