//! Table definitions for the content model.

use super::types::{column, ColumnDef, ColumnDefault, IndexDef, OnDelete, PgType, TableDef};

const fn id() -> ColumnDef {
    column("id", PgType::Uuid).not_null().default(ColumnDefault::RandomUuid)
}

const fn date_created(pg_type: PgType) -> ColumnDef {
    column("date_created", pg_type).not_null().default(ColumnDefault::Now)
}

const fn date_updated() -> ColumnDef {
    column("date_updated", PgType::Timestamp).touch_on_update()
}

const fn publish_status() -> ColumnDef {
    column("publish_status", PgType::PublishStatus)
        .not_null()
        .default(ColumnDefault::Text("draft"))
}

pub static AUTHORS: TableDef = TableDef {
    name: "authors",
    columns: &[
        id(),
        column("first_name", PgType::Text).not_null(),
        column("last_name", PgType::Text).not_null(),
        column("email", PgType::Text).not_null().unique(),
        column("title", PgType::Text).default(ColumnDefault::Text("Founder")),
        column("bio", PgType::Text).default(ColumnDefault::Text("")),
        column("location", PgType::Text).default(ColumnDefault::Text("New York, NY")),
        date_created(PgType::Timestamp),
        date_updated(),
    ],
    primary_key: &["id"],
    indexes: &[],
};

pub static BRANDS: TableDef = TableDef {
    name: "brands",
    columns: &[
        id(),
        column("name", PgType::Text).not_null(),
        column("linkedin_profile", PgType::Text).field("linkedInProfile"),
        column("twitter_profile", PgType::Text),
        column("website_url", PgType::Text),
        date_created(PgType::Timestamp),
        date_updated(),
    ],
    primary_key: &["id"],
    indexes: &[],
};

pub static ARTICLES: TableDef = TableDef {
    name: "articles",
    columns: &[
        id(),
        column("title", PgType::Text).not_null(),
        column("content", PgType::Text).not_null(),
        column("slug", PgType::Text).not_null().unique().slug_of("title"),
        column("author_id", PgType::Uuid)
            .not_null()
            .references("authors", OnDelete::NoAction),
        column("brand_id", PgType::Uuid)
            .not_null()
            .references("brands", OnDelete::NoAction),
        publish_status(),
        date_created(PgType::Timestamp),
        date_updated(),
    ],
    primary_key: &["id"],
    indexes: &[],
};

pub static TAGS: TableDef = TableDef {
    name: "tags",
    columns: &[
        id(),
        column("name", PgType::Text).not_null(),
        column("slug", PgType::Text).not_null().unique().slug_of("name"),
        date_created(PgType::Timestamp),
        date_updated(),
    ],
    primary_key: &["id"],
    indexes: &[],
};

pub static LINKEDIN_POSTS: TableDef = TableDef {
    name: "linkedin_posts",
    columns: &[
        id(),
        column("title", PgType::Text),
        date_created(PgType::Timestamp),
        date_updated(),
        publish_status(),
        column("main_article_id", PgType::Uuid).references("articles", OnDelete::SetNull),
        column("brand_id", PgType::Uuid).references("brands", OnDelete::Cascade),
        column("author_id", PgType::Uuid).references("authors", OnDelete::SetNull),
    ],
    primary_key: &["id"],
    indexes: &[],
};

pub static TWEET_POSTS: TableDef = TableDef {
    name: "tweet_posts",
    columns: &[
        id(),
        column("main_article_id", PgType::Uuid).references("articles", OnDelete::SetNull),
        column("brand_id", PgType::Uuid).references("brands", OnDelete::Cascade),
        column("author_id", PgType::Uuid).references("authors", OnDelete::SetNull),
        publish_status(),
        column("title", PgType::Text),
        date_created(PgType::Timestamptz),
        date_updated(),
    ],
    primary_key: &["id"],
    indexes: &[],
};

pub static TWEETS: TableDef = TableDef {
    name: "tweets",
    columns: &[
        id(),
        column("content", PgType::Text).not_null(),
        column("tweet_post_id", PgType::Uuid).references("tweet_posts", OnDelete::Cascade),
        // 0 = standalone tweet, >0 = position in thread
        column("position", PgType::Integer).not_null().default(ColumnDefault::Int(0)),
        date_created(PgType::Timestamptz),
        date_updated(),
    ],
    primary_key: &["id"],
    indexes: &[IndexDef {
        name: "tweets_position_idx",
        columns: &["tweet_post_id", "position"],
        unique: true,
        predicate: Some("\"tweet_post_id\" IS NOT NULL"),
    }],
};

pub static ARTICLE_TAGS: TableDef = TableDef {
    name: "article_tags",
    columns: &[
        column("article_id", PgType::Uuid)
            .not_null()
            .references("articles", OnDelete::NoAction),
        column("tag_id", PgType::Uuid)
            .not_null()
            .references("tags", OnDelete::NoAction),
    ],
    primary_key: &["article_id", "tag_id"],
    indexes: &[],
};

pub static BRAND_TAGS: TableDef = TableDef {
    name: "brand_tags",
    columns: &[
        column("brand_id", PgType::Uuid)
            .not_null()
            .references("brands", OnDelete::NoAction),
        column("tag_id", PgType::Uuid)
            .not_null()
            .references("tags", OnDelete::NoAction),
    ],
    primary_key: &["brand_id", "tag_id"],
    indexes: &[],
};

/// Every table, ordered so that referenced tables come first.
pub static ALL_TABLES: [&TableDef; 9] = [
    &AUTHORS,
    &BRANDS,
    &ARTICLES,
    &TAGS,
    &LINKEDIN_POSTS,
    &TWEET_POSTS,
    &TWEETS,
    &ARTICLE_TAGS,
    &BRAND_TAGS,
];
