//! Schema DDL from the static table definitions: the enum type, tables with
//! primary and foreign keys, and indexes. Order follows PostgreSQL dependencies.

use crate::error::StoreError;
use crate::schema::{ColumnDef, TableDef, ALL_TABLES, PUBLISH_STATUSES, PUBLISH_STATUS_TYPE};
use crate::sql::quoted;
use sqlx::PgPool;

fn literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// `CREATE TYPE` has no `IF NOT EXISTS`; swallow the duplicate instead.
pub fn create_enum_sql() -> String {
    let values: Vec<String> = PUBLISH_STATUSES.iter().map(|v| literal(v)).collect();
    format!(
        "DO $$ BEGIN CREATE TYPE {} AS ENUM ({}); EXCEPTION WHEN duplicate_object THEN NULL; END $$",
        quoted(PUBLISH_STATUS_TYPE),
        values.join(", ")
    )
}

fn column_sql(c: &ColumnDef) -> String {
    let mut def = format!("{} {}", quoted(c.name), c.pg_type.ddl_name());
    if let Some(source) = c.slug_of {
        def.push_str(&format!(
            " GENERATED ALWAYS AS (lower(replace({}, ' ', '-'))) STORED",
            quoted(source)
        ));
    }
    if !c.nullable {
        def.push_str(" NOT NULL");
    }
    if let Some(d) = c.default {
        def.push_str(" DEFAULT ");
        def.push_str(&d.sql());
    }
    if c.unique {
        def.push_str(" UNIQUE");
    }
    def
}

pub fn create_table_sql(table: &TableDef) -> String {
    let mut defs: Vec<String> = table.columns.iter().map(column_sql).collect();
    let pk: Vec<String> = table.primary_key.iter().map(|c| quoted(c)).collect();
    defs.push(format!("PRIMARY KEY ({})", pk.join(", ")));
    for c in table.columns {
        if let Some(r) = c.references {
            defs.push(format!(
                "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} (\"id\") ON DELETE {}",
                quoted(&format!("{}_{}_fkey", table.name, c.name)),
                quoted(c.name),
                quoted(r.table),
                r.on_delete.sql()
            ));
        }
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quoted(table.name),
        defs.join(",\n  ")
    )
}

pub fn create_index_sql(table: &TableDef) -> Vec<String> {
    table
        .indexes
        .iter()
        .map(|idx| {
            let cols: Vec<String> = idx.columns.iter().map(|c| quoted(c)).collect();
            let mut sql = format!(
                "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
                if idx.unique { "UNIQUE " } else { "" },
                quoted(idx.name),
                quoted(table.name),
                cols.join(", ")
            );
            if let Some(p) = idx.predicate {
                sql.push_str(" WHERE ");
                sql.push_str(p);
            }
            sql
        })
        .collect()
}

/// Every statement, in execution order.
pub fn migration_statements() -> Vec<String> {
    let mut out = vec![create_enum_sql()];
    for table in ALL_TABLES {
        out.push(create_table_sql(table));
        out.extend(create_index_sql(table));
    }
    out
}

/// Create the enum type, tables and indexes. Idempotent.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), StoreError> {
    for sql in migration_statements() {
        tracing::debug!(sql = %sql, "migration");
        sqlx::query(&sql).execute(pool).await?;
    }
    tracing::info!(tables = ALL_TABLES.len(), "migrations applied");
    Ok(())
}

pub fn reset_statements() -> Vec<String> {
    let tables: Vec<String> = ALL_TABLES.iter().rev().map(|t| quoted(t.name)).collect();
    vec![
        format!("DROP TABLE IF EXISTS {} CASCADE", tables.join(", ")),
        format!("DROP TYPE IF EXISTS {}", quoted(PUBLISH_STATUS_TYPE)),
    ]
}

/// Drop every table and the enum type. All data is lost.
pub async fn reset(pool: &PgPool) -> Result<(), StoreError> {
    for sql in reset_statements() {
        tracing::debug!(sql = %sql, "reset");
        sqlx::query(&sql).execute(pool).await?;
    }
    tracing::warn!("database reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ARTICLES, TWEETS};

    #[test]
    fn slug_is_a_generated_column() {
        let sql = create_table_sql(&ARTICLES);
        assert!(sql.contains(
            "\"slug\" text GENERATED ALWAYS AS (lower(replace(\"title\", ' ', '-'))) STORED NOT NULL UNIQUE"
        ));
        assert!(sql.contains("\"id\" uuid NOT NULL DEFAULT gen_random_uuid()"));
        assert!(sql.contains("\"publish_status\" publish_status NOT NULL DEFAULT 'draft'"));
        assert!(sql.contains(
            "CONSTRAINT \"articles_brand_id_fkey\" FOREIGN KEY (\"brand_id\") REFERENCES \"brands\" (\"id\") ON DELETE NO ACTION"
        ));
    }

    #[test]
    fn tweet_position_index_is_partial() {
        assert_eq!(
            create_index_sql(&TWEETS),
            vec![
                "CREATE UNIQUE INDEX IF NOT EXISTS \"tweets_position_idx\" ON \"tweets\" (\"tweet_post_id\", \"position\") WHERE \"tweet_post_id\" IS NOT NULL"
                    .to_string()
            ]
        );
    }

    #[test]
    fn enum_comes_first_and_tables_follow_dependencies() {
        let stmts = migration_statements();
        assert!(stmts[0].contains("CREATE TYPE \"publish_status\" AS ENUM ('draft', 'in-review'"));
        let pos = |name: &str| {
            stmts
                .iter()
                .position(|s| s.starts_with(&format!("CREATE TABLE IF NOT EXISTS \"{}\"", name)))
                .unwrap()
        };
        assert!(pos("authors") < pos("articles"));
        assert!(pos("tweet_posts") < pos("tweets"));
        assert!(pos("tags") < pos("brand_tags"));
    }

    #[test]
    fn link_tables_have_composite_keys() {
        let sql = create_table_sql(&crate::schema::BRAND_TAGS);
        assert!(sql.contains("PRIMARY KEY (\"brand_id\", \"tag_id\")"));
    }

    #[test]
    fn reset_drops_dependents_first() {
        let stmts = reset_statements();
        assert!(stmts[0].starts_with("DROP TABLE IF EXISTS \"brand_tags\", \"article_tags\""));
        assert_eq!(stmts[1], "DROP TYPE IF EXISTS \"publish_status\"");
    }
}
