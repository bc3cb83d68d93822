//! Content model: the closed set of addressable resources and their tables.

mod tables;
mod types;

pub use tables::*;
pub use types::*;

use crate::error::ApiError;
use std::str::FromStr;

/// A resource addressable through the generic router.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Articles,
    Authors,
    Brands,
    Tags,
    LinkedinPosts,
    Tweets,
    TweetPosts,
}

impl ResourceKind {
    pub const COUNT: usize = 7;

    /// All kinds, in discriminant order.
    pub const ALL: [ResourceKind; Self::COUNT] = [
        ResourceKind::Articles,
        ResourceKind::Authors,
        ResourceKind::Brands,
        ResourceKind::Tags,
        ResourceKind::LinkedinPosts,
        ResourceKind::Tweets,
        ResourceKind::TweetPosts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Articles => "articles",
            ResourceKind::Authors => "authors",
            ResourceKind::Brands => "brands",
            ResourceKind::Tags => "tags",
            ResourceKind::LinkedinPosts => "linkedin_posts",
            ResourceKind::Tweets => "tweets",
            ResourceKind::TweetPosts => "tweet_posts",
        }
    }

    pub fn table(&self) -> &'static TableDef {
        match self {
            ResourceKind::Articles => &ARTICLES,
            ResourceKind::Authors => &AUTHORS,
            ResourceKind::Brands => &BRANDS,
            ResourceKind::Tags => &TAGS,
            ResourceKind::LinkedinPosts => &LINKEDIN_POSTS,
            ResourceKind::Tweets => &TWEETS,
            ResourceKind::TweetPosts => &TWEET_POSTS,
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl FromStr for ResourceKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ApiError::HandlerNotFound(s.to_string()))
    }
}

/// Columns in any table holding a foreign key to `table`.
pub fn referencing(table: &str) -> impl Iterator<Item = (&'static TableDef, &'static ColumnDef)> + '_ {
    ALL_TABLES.iter().copied().flat_map(move |t| {
        t.columns
            .iter()
            .filter(move |c| c.references.map(|r| r.table == table).unwrap_or(false))
            .map(move |c| (t, c))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
            assert_eq!(ResourceKind::ALL[kind.index()], kind);
        }
    }

    #[test]
    fn unknown_name_is_handler_not_found() {
        let err = "nonexistent".parse::<ResourceKind>().unwrap_err();
        assert!(matches!(err, ApiError::HandlerNotFound(ref n) if n == "nonexistent"));
        // Names are exact; camelCase spellings do not resolve.
        assert!("linkedInPosts".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn every_resource_table_has_a_uuid_id() {
        for kind in ResourceKind::ALL {
            let table = kind.table();
            assert_eq!(table.primary_key, &["id"]);
            assert_eq!(table.column("id").map(|c| c.pg_type), Some(PgType::Uuid));
        }
    }

    #[test]
    fn references_point_at_known_tables() {
        for table in ALL_TABLES {
            for c in table.columns {
                if let Some(r) = c.references {
                    assert!(
                        ALL_TABLES.iter().any(|t| t.name == r.table),
                        "{}.{}",
                        table.name,
                        c.name
                    );
                }
            }
        }
    }

    #[test]
    fn brands_are_referenced_by_content_and_links() {
        let mut names: Vec<_> = referencing("brands").map(|(t, c)| (t.name, c.name)).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                ("articles", "brand_id"),
                ("brand_tags", "brand_id"),
                ("linkedin_posts", "brand_id"),
                ("tweet_posts", "brand_id"),
            ]
        );
    }
}
