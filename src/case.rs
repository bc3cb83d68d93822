//! Case conversion between database column names (snake_case) and API field names (camelCase).

/// Convert a single identifier from snake_case to camelCase.
/// e.g. "author_id" -> "authorId", "date_created" -> "dateCreated"
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::to_camel_case;

    #[test]
    fn converts_column_names() {
        assert_eq!(to_camel_case("id"), "id");
        assert_eq!(to_camel_case("author_id"), "authorId");
        assert_eq!(to_camel_case("main_article_id"), "mainArticleId");
        assert_eq!(to_camel_case("date_updated"), "dateUpdated");
    }
}
