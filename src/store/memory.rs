//! In-process store with the same constraint semantics as the PostgreSQL schema:
//! defaults, generated slugs, NOT NULL, uniqueness, foreign keys and ON DELETE
//! actions. Backs local development and tests.

use crate::error::StoreError;
use crate::registry::{ContentLookup, ResourceBundle};
use crate::schema::{
    referencing, slugify, ColumnDefault, OnDelete, ResourceKind, TableDef, ARTICLES, ARTICLE_TAGS,
    AUTHORS, BRAND_TAGS, TAGS,
};
use crate::service::Row;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bundle(&self, kind: ResourceKind) -> MemoryBundle {
        MemoryBundle {
            store: self.clone(),
            kind,
        }
    }

    pub async fn link_brand_tag(&self, brand_id: Uuid, tag_id: Uuid) -> Result<(), StoreError> {
        let values = link_values("brand_id", brand_id, tag_id);
        self.tables.write().await.insert(&BRAND_TAGS, &values)?;
        Ok(())
    }

    pub async fn link_article_tag(&self, article_id: Uuid, tag_id: Uuid) -> Result<(), StoreError> {
        let values = link_values("article_id", article_id, tag_id);
        self.tables.write().await.insert(&ARTICLE_TAGS, &values)?;
        Ok(())
    }
}

fn link_values(owner_column: &str, owner: Uuid, tag_id: Uuid) -> Row {
    let mut values = Map::new();
    values.insert(owner_column.to_string(), Value::String(owner.to_string()));
    values.insert("tag_id".into(), Value::String(tag_id.to_string()));
    values
}

fn id_value(id: Uuid) -> Value {
    Value::String(id.to_string())
}

#[derive(Default)]
struct Tables {
    rows: HashMap<&'static str, Vec<Row>>,
}

#[derive(Default)]
struct DeletePlan {
    deletes: Vec<(&'static str, usize)>,
    nulls: Vec<(&'static str, usize, &'static str)>,
    /// (referencing table, row, referenced table) for NO ACTION references.
    restricted: Vec<(&'static str, usize, &'static str)>,
}

impl Tables {
    fn rows(&self, table: &str) -> &[Row] {
        self.rows.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    fn rows_mut(&mut self, table: &'static str) -> &mut Vec<Row> {
        self.rows.entry(table).or_default()
    }

    fn position(&self, table: &TableDef, id: &Value) -> Option<usize> {
        self.rows(table.name).iter().position(|r| r.get("id") == Some(id))
    }

    fn find(&self, table: &TableDef, id: &Value) -> Option<&Row> {
        self.rows(table.name).iter().find(|r| r.get("id") == Some(id))
    }

    /// Full row from column values: coerced input, defaults for omitted columns, generated columns last.
    fn build_row(table: &TableDef, values: &Row) -> Result<Row, StoreError> {
        let mut row = Map::new();
        for c in table.columns.iter().filter(|c| !c.is_generated()) {
            let v = match values.get(c.name) {
                Some(v) => c.coerce(v)?,
                None => c.default.map(|d| d.value()).unwrap_or(Value::Null),
            };
            row.insert(c.name.to_string(), v);
        }
        Self::fill_generated(table, &mut row);
        Ok(row)
    }

    fn fill_generated(table: &TableDef, row: &mut Row) {
        for c in table.columns {
            if let Some(source) = c.slug_of {
                let slug = row
                    .get(source)
                    .and_then(Value::as_str)
                    .map(|s| Value::String(slugify(s)))
                    .unwrap_or(Value::Null);
                row.insert(c.name.to_string(), slug);
            }
        }
    }

    /// NOT NULL, foreign key existence, unique columns, primary key and unique indexes.
    fn check_row(&self, table: &'static TableDef, row: &Row, skip: Option<usize>) -> Result<(), StoreError> {
        for c in table.columns {
            let v = row.get(c.name).unwrap_or(&Value::Null);
            if v.is_null() {
                if !c.nullable {
                    return Err(StoreError::NotNull { table: table.name, column: c.name });
                }
                continue;
            }
            if let Some(r) = c.references {
                if !self.rows(r.table).iter().any(|other| other.get("id") == Some(v)) {
                    return Err(StoreError::MissingReference { table: table.name, column: c.name });
                }
            }
            let single_pk = table.primary_key.len() == 1 && table.is_primary_key(c.name);
            if (c.unique || single_pk) && self.conflicts(table, row, &[c.name], skip) {
                return Err(StoreError::Unique { table: table.name, column: c.name });
            }
        }
        if table.primary_key.len() > 1 && self.conflicts(table, row, table.primary_key, skip) {
            return Err(StoreError::Unique { table: table.name, column: table.primary_key[0] });
        }
        for idx in table.indexes.iter().filter(|i| i.unique) {
            if self.conflicts(table, row, idx.columns, skip) {
                return Err(StoreError::Unique { table: table.name, column: idx.name });
            }
        }
        Ok(())
    }

    /// Whether another row has equal, non-null values in all `columns`.
    fn conflicts(&self, table: &TableDef, row: &Row, columns: &[&str], skip: Option<usize>) -> bool {
        if columns.iter().any(|c| row.get(*c).map(Value::is_null).unwrap_or(true)) {
            return false;
        }
        self.rows(table.name)
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .any(|(_, other)| columns.iter().all(|c| other.get(*c) == row.get(*c)))
    }

    fn insert(&mut self, table: &'static TableDef, values: &Row) -> Result<Row, StoreError> {
        let row = Self::build_row(table, values)?;
        self.check_row(table, &row, None)?;
        self.rows_mut(table.name).push(row.clone());
        Ok(row)
    }

    fn update(&mut self, table: &'static TableDef, id: &Value, values: &Row) -> Result<Option<Row>, StoreError> {
        let Some(index) = self.position(table, id) else {
            return Ok(None);
        };
        let mut row = self.rows(table.name)[index].clone();
        for (k, v) in values {
            if let Some(c) = table.column(k) {
                row.insert(c.name.to_string(), c.coerce(v)?);
            }
        }
        for c in table.columns.iter().filter(|c| c.touch_on_update) {
            row.insert(c.name.to_string(), ColumnDefault::Now.value());
        }
        Self::fill_generated(table, &mut row);
        self.check_row(table, &row, Some(index))?;
        self.rows_mut(table.name)[index] = row.clone();
        Ok(Some(row))
    }

    fn delete(&mut self, table: &'static TableDef, id: &Value) -> Result<bool, StoreError> {
        let Some(index) = self.position(table, id) else {
            return Ok(false);
        };
        let mut plan = DeletePlan::default();
        self.plan_delete(table, index, &mut plan);
        if let Some(&(dependent, _, referenced)) = plan
            .restricted
            .iter()
            .find(|(t, i, _)| !plan.deletes.contains(&(*t, *i)))
        {
            return Err(StoreError::ForeignKey {
                table: referenced,
                referencing: dependent,
            });
        }
        self.apply(plan);
        Ok(true)
    }

    fn plan_delete(&self, table: &'static TableDef, index: usize, plan: &mut DeletePlan) {
        if plan.deletes.contains(&(table.name, index)) {
            return;
        }
        plan.deletes.push((table.name, index));
        let Some(key) = self.rows(table.name).get(index).and_then(|r| r.get("id")).cloned() else {
            return;
        };
        for (dep, col) in referencing(table.name) {
            let Some(reference) = col.references else { continue };
            let matching: Vec<usize> = self
                .rows(dep.name)
                .iter()
                .enumerate()
                .filter(|(_, r)| r.get(col.name) == Some(&key))
                .map(|(i, _)| i)
                .collect();
            for i in matching {
                match reference.on_delete {
                    OnDelete::NoAction => plan.restricted.push((dep.name, i, table.name)),
                    OnDelete::SetNull => plan.nulls.push((dep.name, i, col.name)),
                    OnDelete::Cascade => self.plan_delete(dep, i, plan),
                }
            }
        }
    }

    fn apply(&mut self, plan: DeletePlan) {
        for (t, i, col) in plan.nulls {
            if !plan.deletes.contains(&(t, i)) {
                self.rows_mut(t)[i].insert(col.to_string(), Value::Null);
            }
        }
        let mut deletes = plan.deletes;
        deletes.sort_by(|a, b| b.1.cmp(&a.1));
        for (t, i) in deletes {
            self.rows_mut(t).remove(i);
        }
    }
}

pub struct MemoryBundle {
    store: MemoryStore,
    kind: ResourceKind,
}

#[async_trait]
impl ResourceBundle for MemoryBundle {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn find_all(&self) -> Result<Vec<Value>, StoreError> {
        let table = self.kind.table();
        let tables = self.store.tables.read().await;
        Ok(tables
            .rows(table.name)
            .iter()
            .map(|r| table.entity_from_row(r.clone()))
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Value>, StoreError> {
        let table = self.kind.table();
        let tables = self.store.tables.read().await;
        Ok(tables
            .find(table, &id_value(id))
            .map(|r| table.entity_from_row(r.clone())))
    }

    async fn create(&self, input: Map<String, Value>) -> Result<Value, StoreError> {
        let table = self.kind.table();
        let row = self.store.tables.write().await.insert(table, &table.insert_values(&input))?;
        Ok(table.entity_from_row(row))
    }

    async fn update(&self, id: Uuid, input: Map<String, Value>) -> Result<Option<Value>, StoreError> {
        let table = self.kind.table();
        let row = self
            .store
            .tables
            .write()
            .await
            .update(table, &id_value(id), &table.update_values(&input))?;
        Ok(row.map(|r| table.entity_from_row(r)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let table = self.kind.table();
        self.store.tables.write().await.delete(table, &id_value(id))
    }
}

#[async_trait]
impl ContentLookup for MemoryStore {
    async fn tags_by_brand(&self, brand_id: Uuid) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().await;
        let brand = id_value(brand_id);
        Ok(tables
            .rows(BRAND_TAGS.name)
            .iter()
            .filter(|link| link.get("brand_id") == Some(&brand))
            .filter_map(|link| link.get("tag_id"))
            .filter_map(|tag_id| tables.find(&TAGS, tag_id))
            .map(|tag| json!({ "name": tag.get("name"), "slug": tag.get("slug") }))
            .collect())
    }

    async fn article_info_by_slug(&self, slug: &str) -> Result<Option<Value>, StoreError> {
        let tables = self.tables.read().await;
        let Some(article) = tables
            .rows(ARTICLES.name)
            .iter()
            .find(|r| r.get("slug").and_then(Value::as_str) == Some(slug))
        else {
            return Ok(None);
        };
        let author = article
            .get("author_id")
            .and_then(|id| tables.find(&AUTHORS, id))
            .map(|a| {
                json!({
                    "firstName": a.get("first_name"),
                    "lastName": a.get("last_name"),
                    "title": a.get("title"),
                    "bio": a.get("bio"),
                    "location": a.get("location"),
                    "dateCreated": a.get("date_created"),
                })
            })
            .unwrap_or(Value::Null);
        let tags: Vec<Value> = tables
            .rows(ARTICLE_TAGS.name)
            .iter()
            .filter(|link| link.get("article_id") == article.get("id"))
            .filter_map(|link| {
                let tag = tables.find(&TAGS, link.get("tag_id")?)?;
                Some(json!({
                    "articleId": link.get("article_id"),
                    "tagId": link.get("tag_id"),
                    "tag": { "name": tag.get("name"), "slug": tag.get("slug") },
                }))
            })
            .collect();

        let mut info = ARTICLES.entity_from_row(article.clone());
        if let Value::Object(map) = &mut info {
            map.insert("author".into(), author);
            map.insert("tags".into(), Value::Array(tags));
        }
        Ok(Some(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    fn id_of(entity: &Value) -> Uuid {
        Uuid::parse_str(entity["id"].as_str().unwrap()).unwrap()
    }

    async fn seed_author_and_brand(store: &MemoryStore) -> (Uuid, Uuid) {
        let author = store
            .bundle(ResourceKind::Authors)
            .create(body(json!({ "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com" })))
            .await
            .unwrap();
        let brand = store
            .bundle(ResourceKind::Brands)
            .create(body(json!({ "name": "Acme", "linkedInProfile": "acme" })))
            .await
            .unwrap();
        (id_of(&author), id_of(&brand))
    }

    #[tokio::test]
    async fn create_applies_defaults_and_field_names() {
        let store = MemoryStore::new();
        let (author_id, brand_id) = seed_author_and_brand(&store).await;
        let author = store.bundle(ResourceKind::Authors).find_by_id(author_id).await.unwrap().unwrap();
        assert_eq!(author["title"], "Founder");
        assert_eq!(author["location"], "New York, NY");
        assert_eq!(author["bio"], "");
        assert!(author["dateCreated"].is_string());
        assert!(author["dateUpdated"].is_null());

        let brand = store.bundle(ResourceKind::Brands).find_by_id(brand_id).await.unwrap().unwrap();
        assert_eq!(brand["linkedInProfile"], "acme");
    }

    #[tokio::test]
    async fn slug_is_generated_and_not_writable() {
        let store = MemoryStore::new();
        let tags = store.bundle(ResourceKind::Tags);
        let tag = tags
            .create(body(json!({ "name": "Machine Learning", "slug": "ignored" })))
            .await
            .unwrap();
        assert_eq!(tag["slug"], "machine-learning");

        let updated = tags
            .update(id_of(&tag), body(json!({ "name": "Deep Learning" })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["slug"], "deep-learning");
        assert!(updated["dateUpdated"].is_string());
    }

    #[tokio::test]
    async fn constraint_violations_are_errors() {
        let store = MemoryStore::new();
        let authors = store.bundle(ResourceKind::Authors);
        let err = authors.create(body(json!({ "firstName": "A" }))).await.unwrap_err();
        assert!(matches!(err, StoreError::NotNull { column: "last_name", .. }));

        seed_author_and_brand(&store).await;
        let err = authors
            .create(body(json!({ "firstName": "B", "lastName": "C", "email": "ada@example.com" })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unique { column: "email", .. }));

        let err = store
            .bundle(ResourceKind::Articles)
            .create(body(json!({
                "title": "T", "content": "C",
                "authorId": Uuid::new_v4().to_string(),
                "brandId": Uuid::new_v4().to_string(),
            })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { column: "author_id", .. }));

        let err = store
            .bundle(ResourceKind::Tweets)
            .create(body(json!({ "content": "hi", "position": "first" })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue { column: "position", .. }));
    }

    #[tokio::test]
    async fn tweet_positions_are_unique_within_a_post() {
        let store = MemoryStore::new();
        let post = store.bundle(ResourceKind::TweetPosts).create(Map::new()).await.unwrap();
        let tweets = store.bundle(ResourceKind::Tweets);
        let post_id = post["id"].clone();
        tweets
            .create(body(json!({ "content": "1", "tweetPostId": post_id, "position": 1 })))
            .await
            .unwrap();
        let err = tweets
            .create(body(json!({ "content": "2", "tweetPostId": post_id, "position": 1 })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unique { column: "tweets_position_idx", .. }));
        // standalone tweets share position 0 freely
        tweets.create(body(json!({ "content": "a" }))).await.unwrap();
        tweets.create(body(json!({ "content": "b" }))).await.unwrap();
    }

    #[tokio::test]
    async fn delete_honours_on_delete_actions() {
        let store = MemoryStore::new();
        let (author_id, brand_id) = seed_author_and_brand(&store).await;
        let post = store
            .bundle(ResourceKind::TweetPosts)
            .create(body(json!({ "brandId": brand_id.to_string(), "authorId": author_id.to_string() })))
            .await
            .unwrap();
        store
            .bundle(ResourceKind::Tweets)
            .create(body(json!({ "content": "x", "tweetPostId": post["id"] })))
            .await
            .unwrap();

        // SET NULL on the post's author
        assert!(store.bundle(ResourceKind::Authors).delete(author_id).await.unwrap());
        let post = store.bundle(ResourceKind::TweetPosts).find_by_id(id_of(&post)).await.unwrap().unwrap();
        assert!(post["authorId"].is_null());

        // CASCADE from brand through tweet post to tweets
        assert!(store.bundle(ResourceKind::Brands).delete(brand_id).await.unwrap());
        assert!(store.bundle(ResourceKind::TweetPosts).find_all().await.unwrap().is_empty());
        assert!(store.bundle(ResourceKind::Tweets).find_all().await.unwrap().is_empty());

        assert!(!store.bundle(ResourceKind::Brands).delete(brand_id).await.unwrap());
    }

    #[tokio::test]
    async fn restricted_delete_leaves_rows_untouched() {
        let store = MemoryStore::new();
        let (author_id, brand_id) = seed_author_and_brand(&store).await;
        store
            .bundle(ResourceKind::Articles)
            .create(body(json!({
                "title": "T", "content": "C",
                "authorId": author_id.to_string(), "brandId": brand_id.to_string(),
            })))
            .await
            .unwrap();
        let err = store.bundle(ResourceKind::Brands).delete(brand_id).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey { table: "brands", referencing: "articles" }));
        assert!(store.bundle(ResourceKind::Brands).find_by_id(brand_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn lookups_follow_link_tables() {
        let store = MemoryStore::new();
        let (author_id, brand_id) = seed_author_and_brand(&store).await;
        let tag = store.bundle(ResourceKind::Tags).create(body(json!({ "name": "Rust Lang" }))).await.unwrap();
        let article = store
            .bundle(ResourceKind::Articles)
            .create(body(json!({
                "title": "Hello World", "content": "C",
                "authorId": author_id.to_string(), "brandId": brand_id.to_string(),
            })))
            .await
            .unwrap();
        store.link_brand_tag(brand_id, id_of(&tag)).await.unwrap();
        store.link_article_tag(id_of(&article), id_of(&tag)).await.unwrap();
        assert!(store.link_brand_tag(brand_id, id_of(&tag)).await.is_err());

        let tags = store.tags_by_brand(brand_id).await.unwrap();
        assert_eq!(tags, vec![json!({ "name": "Rust Lang", "slug": "rust-lang" })]);

        let info = store.article_info_by_slug("hello-world").await.unwrap().unwrap();
        assert_eq!(info["author"]["firstName"], "Ada");
        assert_eq!(info["tags"][0]["tag"]["slug"], "rust-lang");
        assert_eq!(info["tags"][0]["articleId"], article["id"]);
        assert!(store.article_info_by_slug("missing").await.unwrap().is_none());

        // link rows restrict deleting the tag
        let err = store.bundle(ResourceKind::Tags).delete(id_of(&tag)).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey { table: "tags", .. }));
    }
}
