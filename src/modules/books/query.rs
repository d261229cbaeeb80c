//! Translation of search bodies into store queries.

use serde_json::{Map, Value};

use super::models::BookQuery;
use super::validation::{text_field, text_list_field, Field, FieldError, ValidationFailure};

pub const AUTHORS_FORMAT_ERROR: &str = "Incorrect format or no authors specified to search";
pub const SEARCH_WORD_FORMAT_ERROR: &str = "Incorrect format or missing search word";

/// Build an "any of these authors" query from `{"authors": [...]}`.
///
/// Empty names are allowed here; they simply match nothing.
pub fn authors_query(payload: &Map<String, Value>) -> Result<BookQuery, ValidationFailure> {
    let reason = match text_list_field(payload, "authors") {
        Field::Value(authors) if !authors.is_empty() => return Ok(BookQuery::AnyAuthor(authors)),
        Field::Value(_) => "must contain at least one author",
        Field::Malformed => "must be an array of strings",
        Field::Absent => "is required",
    };
    tracing::error!(reason, "{}", AUTHORS_FORMAT_ERROR);
    Err(ValidationFailure::new(
        AUTHORS_FORMAT_ERROR,
        vec![FieldError {
            field: "authors",
            reason,
        }],
    ))
}

/// Build a full-text title query from `{"searchWord": "..."}`.
pub fn title_query(payload: &Map<String, Value>) -> Result<BookQuery, ValidationFailure> {
    let reason = match text_field(payload, "searchWord") {
        Field::Value(word) if !word.is_empty() => return Ok(BookQuery::TitleText(word)),
        Field::Value(_) => "must not be empty",
        Field::Malformed => "must be a string",
        Field::Absent => "is required",
    };
    tracing::error!(reason, "{}", SEARCH_WORD_FORMAT_ERROR);
    Err(ValidationFailure::new(
        SEARCH_WORD_FORMAT_ERROR,
        vec![FieldError {
            field: "searchWord",
            reason,
        }],
    ))
}

/// Human-readable search terms for not-found messages and logs.
pub fn describe(query: &BookQuery) -> String {
    match query {
        BookQuery::AnyAuthor(authors) => authors.join(","),
        BookQuery::TitleText(word) => word.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn authors_query_keeps_list_verbatim() {
        let query = authors_query(&object(json!({ "authors": ["b", "", "a"] }))).unwrap();
        assert_eq!(
            query,
            BookQuery::AnyAuthor(vec!["b".to_string(), String::new(), "a".to_string()])
        );
        assert_eq!(describe(&query), "b,,a");
    }

    #[test]
    fn authors_query_rejects_missing_empty_or_scalar() {
        for body in [
            json!({}),
            json!({ "authors": [] }),
            json!({ "authors": "dummy author" }),
            json!({ "authors": 7 }),
            json!({ "authors": [1, 2] }),
        ] {
            let failure = authors_query(&object(body.clone())).unwrap_err();
            assert_eq!(failure.message, AUTHORS_FORMAT_ERROR, "body = {body}");
        }
    }

    #[test]
    fn title_query_requires_non_empty_text() {
        assert_eq!(
            title_query(&object(json!({ "searchWord": "Dummy" }))).unwrap(),
            BookQuery::TitleText("Dummy".to_string())
        );
        for body in [
            json!({}),
            json!({ "word": "dummy" }),
            json!({ "searchWord": "" }),
            json!({ "searchWord": [] }),
            json!({ "searchWord": 1234 }),
        ] {
            let failure = title_query(&object(body.clone())).unwrap_err();
            assert_eq!(failure.message, SEARCH_WORD_FORMAT_ERROR, "body = {body}");
        }
    }
}
