//! Shared tables, associations and rows for integration tests.
//!
//! The blog schema: Articles belong to Authors, Authors have one Profile,
//! Articles have many Comments (fetched separately) and are filtered by Tags
//! through a matching association.

use hydrator_core::association::AssociationDef;
use hydrator_core::query::{EagerLoad, QueryShape};
use hydrator_core::result_set::{MemoryStatement, ResultSet};
use hydrator_core::schema::{Table, TableSchema};
use hydrator_core::types::TypeRegistry;
use hydrator_core::value::{fields, Row, Value};
use std::sync::Arc;

pub fn articles_table() -> Table {
    Table::new(
        "Articles",
        TableSchema::new("articles")
            .column("id", "integer")
            .column("title", "string")
            .column("author_id", "integer")
            .column("published", "boolean"),
    )
}

pub fn authors_table() -> Table {
    Table::new(
        "Authors",
        TableSchema::new("authors")
            .column("id", "integer")
            .column("name", "string"),
    )
}

pub fn profiles_table() -> Table {
    Table::new(
        "Profiles",
        TableSchema::new("profiles")
            .column("id", "integer")
            .column("author_id", "integer")
            .column("bio", "text"),
    )
}

pub fn tags_table() -> Table {
    Table::new(
        "Tags",
        TableSchema::new("tags")
            .column("id", "integer")
            .column("name", "string"),
    )
}

pub fn comments_table() -> Table {
    Table::new(
        "Comments",
        TableSchema::new("comments")
            .column("id", "integer")
            .column("article_id", "integer")
            .column("body", "text"),
    )
}

pub fn preferences_table() -> Table {
    Table::new(
        "Preferences",
        TableSchema::new("preferences")
            .column("id", "integer")
            .column("score", "float")
            .column("data", "json"),
    )
}

pub fn authors_join(authors: Table) -> EagerLoad {
    EagerLoad::joined(Arc::new(AssociationDef::belongs_to(
        "Authors", "Articles", authors,
    )))
}

pub fn profiles_join() -> EagerLoad {
    EagerLoad::joined(Arc::new(AssociationDef::has_one(
        "Profiles",
        "Authors",
        profiles_table(),
    )))
}

pub fn tags_matching() -> EagerLoad {
    EagerLoad::matching(Arc::new(AssociationDef::belongs_to_many(
        "Tags",
        "Articles",
        tags_table(),
    )))
}

pub fn comments_separate() -> EagerLoad {
    EagerLoad::separate(Arc::new(AssociationDef::has_many(
        "Comments",
        "Articles",
        comments_table(),
    )))
}

/// Articles joined to Authors only.
pub fn articles_with_authors() -> QueryShape {
    let authors = authors_table();
    QueryShape::new(articles_table())
        .select(&["id", "title", "author_id", "published"])
        .select_table(&authors)
        .contain(authors_join(authors))
}

/// Articles joined to their one Preferences row, which carries float and
/// json columns.
pub fn articles_with_preferences() -> QueryShape {
    let preferences = preferences_table();
    QueryShape::new(articles_table())
        .select(&["id", "title"])
        .select_table(&preferences)
        .contain(EagerLoad::joined(Arc::new(AssociationDef::has_one(
            "Preferences",
            "Articles",
            preferences,
        ))))
}

/// Articles with every kind of eager load: joined Authors, Profiles nested
/// under Authors, matching Tags and separately fetched Comments.
pub fn blog_shape() -> QueryShape {
    let authors = authors_table();
    QueryShape::new(articles_table())
        .select(&["id", "title", "author_id", "published"])
        .select_table(&authors)
        .select_table(&profiles_table())
        .select_table(&tags_table())
        .contain(authors_join(authors))
        .contain(profiles_join())
        .contain(tags_matching())
        .contain(comments_separate())
}

pub fn article_row(id: i64, title: &str, author: Option<(i64, &str)>) -> Row {
    let (author_id, author_name) = match author {
        Some((author_id, name)) => (Value::Integer(author_id), Value::from(name)),
        None => (Value::Null, Value::Null),
    };

    fields([
        ("id", Value::Integer(id)),
        ("title", Value::from(title)),
        ("author_id", author_id.clone()),
        ("published", Value::Integer(1)),
        ("Authors__id", author_id),
        ("Authors__name", author_name),
    ])
}

/// A full row for `blog_shape`, without separately fetched data.
pub fn blog_row(id: i64, author: Option<(i64, &str)>, bio: Option<&str>, tag: &str) -> Row {
    let mut row = article_row(id, &format!("Article {id}"), author);
    let (profile_id, profile_author_id, bio) = match (bio, author) {
        (Some(bio), Some((author_id, _))) => (
            Value::Integer(id * 10),
            Value::Integer(author_id),
            Value::from(bio),
        ),
        _ => (Value::Null, Value::Null, Value::Null),
    };
    row.insert("Profiles__id".to_string(), profile_id);
    row.insert("Profiles__author_id".to_string(), profile_author_id);
    row.insert("Profiles__bio".to_string(), bio);
    row.insert("Tags__id".to_string(), Value::Integer(100 + id));
    row.insert("Tags__name".to_string(), Value::from(tag));
    row
}

/// A row for `articles_with_preferences`; the preference values arrive in
/// their raw storage form.
pub fn preference_row(id: i64, preference_id: Value, score: Value, data: Value) -> Row {
    fields([
        ("id", Value::Integer(id)),
        ("title", Value::from(format!("Article {id}"))),
        ("Preferences__id", preference_id),
        ("Preferences__score", score),
        ("Preferences__data", data),
    ])
}

pub fn comment(id: i64, article_id: i64, body: &str) -> Value {
    Value::Map(fields([
        ("id", Value::Integer(id)),
        ("article_id", Value::Integer(article_id)),
        ("body", Value::from(body)),
    ]))
}

pub fn three_articles() -> Vec<Row> {
    vec![
        article_row(1, "First", Some((7, "Ann"))),
        article_row(2, "Second", None),
        article_row(3, "Third", Some((8, "Bo"))),
    ]
}

pub fn result_set(shape: &QueryShape, rows: Vec<Row>) -> ResultSet {
    ResultSet::new(shape, MemoryStatement::new(rows), &TypeRegistry::with_defaults())
        .expect("result set should build")
}

/// Root ids of a list of records, in order.
pub fn ids(records: &[Value]) -> Vec<i64> {
    records
        .iter()
        .filter_map(|record| record.get("id").and_then(Value::as_i64))
        .collect()
}
