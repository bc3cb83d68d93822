//! Static table model: columns, types, defaults, constraints.

use crate::case::to_camel_case;
use crate::error::StoreError;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Values of the `publish_status` enum type, in declaration order.
pub const PUBLISH_STATUSES: &[&str] = &["draft", "in-review", "scheduled", "published", "archived"];

pub const PUBLISH_STATUS_TYPE: &str = "publish_status";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PgType {
    Uuid,
    Text,
    Integer,
    /// `timestamp(3)` without time zone; values are treated as UTC.
    Timestamp,
    Timestamptz,
    PublishStatus,
}

impl PgType {
    /// Type name used in DDL.
    pub fn ddl_name(&self) -> &'static str {
        match self {
            PgType::Uuid => "uuid",
            PgType::Text => "text",
            PgType::Integer => "integer",
            PgType::Timestamp => "timestamp(3)",
            PgType::Timestamptz => "timestamptz",
            PgType::PublishStatus => PUBLISH_STATUS_TYPE,
        }
    }

    /// Type name used when casting a bound text parameter.
    pub fn cast_name(&self) -> &'static str {
        match self {
            PgType::Timestamp => "timestamp",
            other => other.ddl_name(),
        }
    }

    /// Columns of user-defined type are selected as text so they decode as strings.
    pub fn select_as_text(&self) -> bool {
        matches!(self, PgType::PublishStatus)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnDefault {
    RandomUuid,
    Now,
    Text(&'static str),
    Int(i64),
}

impl ColumnDefault {
    pub fn sql(&self) -> String {
        match self {
            ColumnDefault::RandomUuid => "gen_random_uuid()".into(),
            ColumnDefault::Now => "NOW()".into(),
            ColumnDefault::Text(s) => format!("'{}'", s.replace('\'', "''")),
            ColumnDefault::Int(n) => n.to_string(),
        }
    }

    /// Value an in-process store assigns when the column is omitted on insert.
    pub fn value(&self) -> Value {
        match self {
            ColumnDefault::RandomUuid => Value::String(uuid::Uuid::new_v4().to_string()),
            ColumnDefault::Now => Value::String(format_timestamp(Utc::now())),
            ColumnDefault::Text(s) => Value::String((*s).to_string()),
            ColumnDefault::Int(n) => Value::Number((*n).into()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnDelete {
    NoAction,
    Cascade,
    SetNull,
}

impl OnDelete {
    pub fn sql(&self) -> &'static str {
        match self {
            OnDelete::NoAction => "NO ACTION",
            OnDelete::Cascade => "CASCADE",
            OnDelete::SetNull => "SET NULL",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Reference {
    pub table: &'static str,
    pub on_delete: OnDelete,
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    /// API field name when it is not the camelCase form of `name`.
    pub field: Option<&'static str>,
    pub pg_type: PgType,
    pub nullable: bool,
    pub default: Option<ColumnDefault>,
    pub unique: bool,
    /// Generated as `lower(replace(<source>, ' ', '-'))`; never written from input.
    pub slug_of: Option<&'static str>,
    /// Set to the current time on every update.
    pub touch_on_update: bool,
    pub references: Option<Reference>,
}

pub const fn column(name: &'static str, pg_type: PgType) -> ColumnDef {
    ColumnDef {
        name,
        field: None,
        pg_type,
        nullable: true,
        default: None,
        unique: false,
        slug_of: None,
        touch_on_update: false,
        references: None,
    }
}

impl ColumnDef {
    pub const fn not_null(self) -> Self {
        ColumnDef { nullable: false, ..self }
    }

    pub const fn default(self, default: ColumnDefault) -> Self {
        ColumnDef { default: Some(default), ..self }
    }

    pub const fn unique(self) -> Self {
        ColumnDef { unique: true, ..self }
    }

    pub const fn field(self, field: &'static str) -> Self {
        ColumnDef { field: Some(field), ..self }
    }

    pub const fn slug_of(self, source: &'static str) -> Self {
        ColumnDef { slug_of: Some(source), ..self }
    }

    pub const fn touch_on_update(self) -> Self {
        ColumnDef { touch_on_update: true, ..self }
    }

    pub const fn references(self, table: &'static str, on_delete: OnDelete) -> Self {
        ColumnDef {
            references: Some(Reference { table, on_delete }),
            ..self
        }
    }

    pub fn field_name(&self) -> Cow<'static, str> {
        match self.field {
            Some(f) => Cow::Borrowed(f),
            None => Cow::Owned(to_camel_case(self.name)),
        }
    }

    pub fn is_generated(&self) -> bool {
        self.slug_of.is_some()
    }

    /// Normalize an input value to what the column stores, rejecting values the
    /// database would refuse to cast.
    pub fn coerce(&self, value: &Value) -> Result<Value, StoreError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let invalid = |reason: &str| StoreError::InvalidValue {
            column: self.name,
            reason: reason.to_string(),
        };
        match self.pg_type {
            PgType::Uuid => {
                let s = value.as_str().ok_or_else(|| invalid("expected a uuid string"))?;
                let u = uuid::Uuid::parse_str(s).map_err(|e| invalid(&e.to_string()))?;
                Ok(Value::String(u.to_string()))
            }
            PgType::Text => match value {
                Value::String(_) => Ok(value.clone()),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::Bool(b) => Ok(Value::String(b.to_string())),
                _ => Err(invalid("expected text")),
            },
            PgType::Integer => {
                let n = match value {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                };
                let n = n
                    .filter(|n| i32::try_from(*n).is_ok())
                    .ok_or_else(|| invalid("expected an integer"))?;
                Ok(Value::Number(n.into()))
            }
            PgType::Timestamp | PgType::Timestamptz => {
                let s = value.as_str().ok_or_else(|| invalid("expected a timestamp string"))?;
                let dt = parse_timestamp(s).ok_or_else(|| invalid("unrecognized timestamp"))?;
                Ok(Value::String(format_timestamp(dt)))
            }
            PgType::PublishStatus => {
                let s = value.as_str().ok_or_else(|| invalid("expected a publish status"))?;
                if PUBLISH_STATUSES.contains(&s) {
                    Ok(value.clone())
                } else {
                    Err(invalid(&format!("'{}' is not a valid {}", s, PUBLISH_STATUS_TYPE)))
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct IndexDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub unique: bool,
    pub predicate: Option<&'static str>,
}

#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub primary_key: &'static [&'static str],
    pub indexes: &'static [IndexDef],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key.contains(&column)
    }

    /// Column values for an INSERT, taken from an API body. Unknown fields and
    /// generated columns are dropped.
    pub fn insert_values(&self, body: &Map<String, Value>) -> Map<String, Value> {
        self.writable_values(body, true)
    }

    /// Column values for an UPDATE. Primary key columns are never updated.
    pub fn update_values(&self, body: &Map<String, Value>) -> Map<String, Value> {
        self.writable_values(body, false)
    }

    fn writable_values(&self, body: &Map<String, Value>, include_pk: bool) -> Map<String, Value> {
        let mut out = Map::new();
        for c in self.columns {
            if c.is_generated() || (!include_pk && self.is_primary_key(c.name)) {
                continue;
            }
            if let Some(v) = body.get(c.field_name().as_ref()) {
                out.insert(c.name.to_string(), v.clone());
            }
        }
        out
    }

    /// Rename a column-keyed row to API field names.
    pub fn entity_from_row(&self, row: Map<String, Value>) -> Value {
        let mut out = Map::new();
        for (k, v) in row {
            match self.column(&k) {
                Some(c) => out.insert(c.field_name().into_owned(), v),
                None => out.insert(k, v),
            };
        }
        Value::Object(out)
    }
}

pub fn slugify(source: &str) -> String {
    source.replace(' ', "-").to_lowercase()
}

pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}
