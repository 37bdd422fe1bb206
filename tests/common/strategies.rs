use hydrator_core::value::{fields, Row, Value};
use proptest::prelude::*;

/// Strategy for generating table aliases
pub fn alias_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9]{0,15}"
}

/// Strategy for generating field names that contain no alias separator
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,11}(_[a-z0-9]{1,6}){0,2}"
}

/// Strategy for generating flat article rows with an optional author
pub fn article_row_strategy() -> impl Strategy<Value = Row> {
    (
        1i64..10_000,
        "[a-zA-Z ]{0,24}",
        prop::option::of((1i64..500, "[A-Z][a-z]{1,10}")),
    )
        .prop_map(|(id, title, author)| {
            let (author_id, name) = match author {
                Some((author_id, name)) => (Value::Integer(author_id), Value::Text(name)),
                None => (Value::Null, Value::Null),
            };
            fields([
                ("id", Value::Integer(id)),
                ("title", Value::Text(title)),
                ("author_id", author_id.clone()),
                ("published", Value::Integer(0)),
                ("Authors__id", author_id),
                ("Authors__name", name),
            ])
        })
}

/// Strategy for generating result sets of up to `max` rows
pub fn article_rows_strategy(max: usize) -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(article_row_strategy(), 0..max)
}

/// Strategy for raw json text, including empty containers
pub fn json_text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("[]".to_string()),
        Just("{}".to_string()),
        Just("[1, 2]".to_string()),
        Just(r#"{"theme": "dark"}"#.to_string()),
        Just("false".to_string()),
    ]
}

/// Strategy for article rows joined to a preference with any float score,
/// non-finite values included
pub fn preference_row_strategy() -> impl Strategy<Value = Row> {
    (
        1i64..10_000,
        prop::option::of(1i64..500),
        prop::option::of(prop::num::f64::ANY),
        prop::option::of(json_text_strategy()),
    )
        .prop_map(|(id, preference_id, score, data)| {
            fields([
                ("id", Value::Integer(id)),
                ("title", Value::Text(format!("Article {id}"))),
                ("Preferences__id", Value::from(preference_id)),
                ("Preferences__score", Value::from(score)),
                ("Preferences__data", Value::from(data)),
            ])
        })
}

/// Strategy for preference result sets of up to `max` rows
pub fn preference_rows_strategy(max: usize) -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(preference_row_strategy(), 0..max)
}
