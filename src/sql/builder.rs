//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from static table definitions.

use crate::schema::{ColumnDef, TableDef, ARTICLES, ARTICLE_TAGS, AUTHORS, BRAND_TAGS, TAGS};
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from table definitions).
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

/// Parameters are bound as text; the placeholder casts to the column type.
fn placeholder(column: &ColumnDef, n: u32) -> String {
    format!("${}::{}", n, column.pg_type.cast_name())
}

/// SELECT list: each column as-is, except enum columns as col::text so sqlx returns String.
fn select_column_list(table: &TableDef, alias: Option<&str>) -> String {
    let prefix = alias.map(|a| format!("{}.", a)).unwrap_or_default();
    table
        .columns
        .iter()
        .map(|c| {
            let q = quoted(c.name);
            if c.pg_type.select_as_text() {
                format!("{}{}::text AS {}", prefix, q, q)
            } else {
                format!("{}{}", prefix, q)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn pk_column(table: &TableDef) -> &str {
    table.primary_key.first().copied().unwrap_or("id")
}

pub fn select_all(table: &TableDef) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT {} FROM {}", select_column_list(table, None), quoted(table.name));
    q
}

/// SELECT by primary key. The id is the sole param.
pub fn select_by_id(table: &TableDef, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}::uuid",
        select_column_list(table, None),
        quoted(table.name),
        quoted(pk_column(table)),
        n
    );
    q
}

/// INSERT the given column values; omitted columns take their database default.
pub fn insert(table: &TableDef, values: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in table.columns {
        let Some(v) = values.get(c.name) else { continue };
        let n = q.push_param(v.clone());
        cols.push(quoted(c.name));
        placeholders.push(placeholder(c, n));
    }
    let returning = select_column_list(table, None);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", quoted(table.name), returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            quoted(table.name),
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// UPDATE by id: SET only the given columns, plus touch-on-update columns to NOW().
pub fn update(table: &TableDef, id: &str, values: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let pk = pk_column(table);
    let mut sets = Vec::new();
    for c in table.columns {
        if c.touch_on_update {
            sets.push(format!("{} = NOW()", quoted(c.name)));
            continue;
        }
        let Some(v) = values.get(c.name) else { continue };
        let n = q.push_param(v.clone());
        sets.push(format!("{} = {}", quoted(c.name), placeholder(c, n)));
    }
    if sets.is_empty() {
        let n = q.push_param(Value::String(id.to_string()));
        q.sql = format!(
            "SELECT {} FROM {} WHERE {} = ${}::uuid",
            select_column_list(table, None),
            quoted(table.name),
            quoted(pk),
            n
        );
        return q;
    }
    let id_param = q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}::uuid RETURNING {}",
        quoted(table.name),
        sets.join(", "),
        quoted(pk),
        id_param,
        select_column_list(table, None)
    );
    q
}

/// DELETE by id, returning the deleted key so callers can tell whether a row matched.
pub fn delete(table: &TableDef, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let pk = quoted(pk_column(table));
    let n = q.push_param(Value::String(id.to_string()));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${}::uuid RETURNING {}",
        quoted(table.name),
        pk,
        n,
        pk
    );
    q
}

/// Tag name and slug for every tag linked to a brand.
pub fn select_tags_by_brand(brand_id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Value::String(brand_id.to_string()));
    q.sql = format!(
        "SELECT t.\"name\", t.\"slug\" FROM {} bt JOIN {} t ON t.\"id\" = bt.\"tag_id\" WHERE bt.\"brand_id\" = ${}::uuid",
        quoted(BRAND_TAGS.name),
        quoted(TAGS.name),
        n
    );
    q
}

/// One article by slug with its author (as a JSON object) and tag links (as a JSON array) in a single query.
pub fn select_article_info_by_slug(slug: &str) -> QueryBuf {
    const MAIN_ALIAS: &str = "main";
    let mut q = QueryBuf::new();
    let n = q.push_param(Value::String(slug.to_string()));
    let author = format!(
        "(SELECT json_build_object(\
            'firstName', au.\"first_name\", 'lastName', au.\"last_name\", 'title', au.\"title\", \
            'bio', au.\"bio\", 'location', au.\"location\", \
            'dateCreated', to_char(au.\"date_created\", 'YYYY-MM-DD\"T\"HH24:MI:SS.MS\"Z\"')) \
         FROM {} au WHERE au.\"id\" = {}.\"author_id\")",
        quoted(AUTHORS.name),
        MAIN_ALIAS
    );
    let tags = format!(
        "(SELECT COALESCE(json_agg(json_build_object(\
            'articleId', at.\"article_id\", 'tagId', at.\"tag_id\", \
            'tag', json_build_object('name', t.\"name\", 'slug', t.\"slug\"))), '[]'::json) \
         FROM {} at JOIN {} t ON t.\"id\" = at.\"tag_id\" WHERE at.\"article_id\" = {}.\"id\")",
        quoted(ARTICLE_TAGS.name),
        quoted(TAGS.name),
        MAIN_ALIAS
    );
    q.sql = format!(
        "SELECT {}, {} AS \"author\", {} AS \"tags\" FROM {} {} WHERE {}.\"slug\" = ${} LIMIT 1",
        select_column_list(&ARTICLES, Some(MAIN_ALIAS)),
        author,
        tags,
        quoted(ARTICLES.name),
        MAIN_ALIAS,
        MAIN_ALIAS,
        n
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BRANDS, TWEETS};
    use serde_json::json;

    #[test]
    fn select_casts_enum_columns_to_text() {
        let q = select_all(&ARTICLES);
        assert!(q.sql.starts_with("SELECT \"id\", \"title\""));
        assert!(q.sql.contains("\"publish_status\"::text AS \"publish_status\""));
        assert!(q.sql.ends_with("FROM \"articles\""));
        assert!(q.params.is_empty());
    }

    #[test]
    fn insert_binds_only_given_columns_with_casts() {
        let mut values = Map::new();
        values.insert("name".into(), json!("Acme"));
        values.insert("website_url".into(), json!("https://acme.test"));
        let q = insert(&BRANDS, &values);
        assert!(q.sql.starts_with(
            "INSERT INTO \"brands\" (\"name\", \"website_url\") VALUES ($1::text, $2::text) RETURNING "
        ));
        assert_eq!(q.params, vec![json!("Acme"), json!("https://acme.test")]);
    }

    #[test]
    fn empty_insert_uses_default_values() {
        let q = insert(&TAGS, &Map::new());
        assert!(q.sql.starts_with("INSERT INTO \"tags\" DEFAULT VALUES RETURNING"));
    }

    #[test]
    fn update_always_touches_date_updated() {
        let id = uuid::Uuid::new_v4().to_string();
        let q = update(&TAGS, &id, &Map::new());
        assert!(q.sql.starts_with("UPDATE \"tags\" SET \"date_updated\" = NOW() WHERE \"id\" = $1::uuid"));
        assert_eq!(q.params, vec![json!(id)]);

        let mut values = Map::new();
        values.insert("position".into(), json!(2));
        let q = update(&TWEETS, &id, &values);
        assert!(q.sql.contains("\"position\" = $1::integer"));
        assert!(q.sql.contains("WHERE \"id\" = $2::uuid"));
    }

    #[test]
    fn delete_returns_key() {
        let q = delete(&BRANDS, "x");
        assert_eq!(q.sql, "DELETE FROM \"brands\" WHERE \"id\" = $1::uuid RETURNING \"id\"");
    }

    #[test]
    fn article_info_is_single_query() {
        let q = select_article_info_by_slug("hello-world");
        assert!(q.sql.contains("AS \"author\""));
        assert!(q.sql.contains("AS \"tags\""));
        assert!(q.sql.ends_with("WHERE main.\"slug\" = $1 LIMIT 1"));
        assert_eq!(q.params, vec![json!("hello-world")]);
    }
}
