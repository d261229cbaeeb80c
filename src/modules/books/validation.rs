//! Creation and partial-update contracts for book payloads.
//!
//! Bodies arrive as untyped JSON objects. Each field is first converted into a
//! [`Field`] tag, and the business rules only ever look at the tags, so a
//! number where a list belongs can never reach the store.

use serde::Serialize;
use serde_json::{Map, Value};

use super::models::{BookPatch, NewBook};

pub const CREATE_FAILURE: &str = "Input validation failed - incorrect or missing input";
pub const PATCH_FAILURE: &str =
    "Patch validation failed - title (string), description (string) and authors (array) must be valid";

/// A payload field after typed conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Value(T),
    /// Present, but not of the expected JSON type (`null` included).
    Malformed,
}

/// Read a text field.
pub fn text_field(payload: &Map<String, Value>, key: &str) -> Field<String> {
    match payload.get(key) {
        None => Field::Absent,
        Some(Value::String(text)) => Field::Value(text.clone()),
        Some(_) => Field::Malformed,
    }
}

/// Read a field that must be an array whose elements are all text.
pub fn text_list_field(payload: &Map<String, Value>, key: &str) -> Field<Vec<String>> {
    match payload.get(key) {
        None => Field::Absent,
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_owned))
            .collect::<Option<Vec<_>>>()
            .map_or(Field::Malformed, Field::Value),
        Some(_) => Field::Malformed,
    }
}

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: &'static str,
}

/// A payload that failed a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub message: &'static str,
    pub errors: Vec<FieldError>,
}

impl ValidationFailure {
    pub fn new(message: &'static str, errors: Vec<FieldError>) -> Self {
        Self { message, errors }
    }
}

impl From<ValidationFailure> for bookshelf_http::error::AppError {
    fn from(failure: ValidationFailure) -> Self {
        let details = failure
            .errors
            .iter()
            .filter_map(|error| serde_json::to_value(error).ok())
            .collect();
        Self::validation(details, failure.message)
    }
}

fn check_text(
    field: &'static str,
    value: Field<String>,
    required: bool,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let reason = match value {
        Field::Value(text) if !text.is_empty() => return Some(text),
        Field::Value(_) => "must not be empty",
        Field::Malformed => "must be a string",
        Field::Absent if required => "is required",
        Field::Absent => return None,
    };
    errors.push(FieldError { field, reason });
    None
}

fn check_authors(
    value: Field<Vec<String>>,
    required: bool,
    errors: &mut Vec<FieldError>,
) -> Option<Vec<String>> {
    let reason = match value {
        Field::Value(authors) if authors.is_empty() => "must contain at least one author",
        Field::Value(authors) if authors.iter().any(String::is_empty) => {
            "must not contain empty names"
        }
        Field::Value(authors) => return Some(authors),
        Field::Malformed => "must be an array of strings",
        Field::Absent if required => "is required",
        Field::Absent => return None,
    };
    errors.push(FieldError {
        field: "authors",
        reason,
    });
    None
}

/// Check a body against the creation contract. Unknown fields are dropped.
pub fn validate_for_create(payload: &Map<String, Value>) -> Result<NewBook, ValidationFailure> {
    let mut errors = Vec::new();
    let title = check_text("title", text_field(payload, "title"), true, &mut errors);
    let description = check_text(
        "description",
        text_field(payload, "description"),
        true,
        &mut errors,
    );
    let authors = check_authors(text_list_field(payload, "authors"), true, &mut errors);

    match (title, description, authors) {
        (Some(title), Some(description), Some(authors)) => Ok(NewBook {
            title,
            description,
            authors,
        }),
        _ => {
            tracing::error!(?errors, "{}", CREATE_FAILURE);
            Err(ValidationFailure::new(CREATE_FAILURE, errors))
        }
    }
}

/// Check a body against the partial-update contract. An empty body is a
/// valid no-op patch.
pub fn validate_for_patch(payload: &Map<String, Value>) -> Result<BookPatch, ValidationFailure> {
    let mut errors = Vec::new();
    let patch = BookPatch {
        title: check_text("title", text_field(payload, "title"), false, &mut errors),
        description: check_text(
            "description",
            text_field(payload, "description"),
            false,
            &mut errors,
        ),
        authors: check_authors(text_list_field(payload, "authors"), false, &mut errors),
    };

    if errors.is_empty() {
        Ok(patch)
    } else {
        tracing::error!(?errors, "{}", PATCH_FAILURE);
        Err(ValidationFailure::new(PATCH_FAILURE, errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn valid() -> Value {
        json!({
            "title": "Dummy Book 1",
            "description": "Dummy description 1",
            "authors": ["dummy author"]
        })
    }

    fn rejected_fields(failure: ValidationFailure) -> Vec<&'static str> {
        failure.errors.into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn text_list_conversion_tags_shapes() {
        let payload = object(json!({
            "ok": ["a", ""],
            "number": 12,
            "string": "abc",
            "mixed": ["a", 1],
            "null": null
        }));
        assert_eq!(
            text_list_field(&payload, "ok"),
            Field::Value(vec!["a".to_string(), String::new()])
        );
        assert_eq!(text_list_field(&payload, "number"), Field::Malformed);
        assert_eq!(text_list_field(&payload, "string"), Field::Malformed);
        assert_eq!(text_list_field(&payload, "mixed"), Field::Malformed);
        assert_eq!(text_list_field(&payload, "null"), Field::Malformed);
        assert_eq!(text_list_field(&payload, "missing"), Field::Absent);
    }

    #[test]
    fn create_accepts_valid_payload_and_drops_extras() {
        let mut payload = object(valid());
        payload.insert("year".to_string(), json!(2021));
        payload.insert("publisher".to_string(), json!("Dummy Press"));

        let book = validate_for_create(&payload).unwrap();
        assert_eq!(book.title, "Dummy Book 1");
        assert_eq!(book.description, "Dummy description 1");
        assert_eq!(book.authors, vec!["dummy author"]);
    }

    #[test]
    fn create_rejects_empty_body() {
        let failure = validate_for_create(&Map::new()).unwrap_err();
        assert_eq!(failure.message, CREATE_FAILURE);
        assert_eq!(
            rejected_fields(failure),
            vec!["title", "description", "authors"]
        );
    }

    #[test]
    fn create_rejects_bad_authors() {
        for authors in [json!([""]), json!(["a", ""]), json!([]), json!(1234), json!("dummy author")] {
            let mut payload = object(valid());
            payload.insert("authors".to_string(), authors.clone());
            let failure = validate_for_create(&payload).unwrap_err();
            assert_eq!(rejected_fields(failure), vec!["authors"], "authors = {authors}");
        }
    }

    #[test]
    fn create_rejects_missing_or_empty_text() {
        let mut payload = object(valid());
        payload.remove("title");
        payload.insert("description".to_string(), json!(""));
        let failure = validate_for_create(&payload).unwrap_err();
        assert_eq!(failure.errors[0], FieldError { field: "title", reason: "is required" });
        assert_eq!(
            failure.errors[1],
            FieldError { field: "description", reason: "must not be empty" }
        );
    }

    #[test]
    fn create_rejects_non_string_title() {
        let mut payload = object(valid());
        payload.insert("title".to_string(), json!(42));
        let failure = validate_for_create(&payload).unwrap_err();
        assert_eq!(
            failure.errors,
            vec![FieldError { field: "title", reason: "must be a string" }]
        );
    }

    #[test]
    fn empty_patch_is_a_valid_no_op() {
        let patch = validate_for_patch(&Map::new()).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn patch_keeps_only_present_fields() {
        let payload = object(json!({ "title": "New", "year": 1999 }));
        let patch = validate_for_patch(&payload).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New"));
        assert!(patch.description.is_none());
        assert!(patch.authors.is_none());
    }

    #[test]
    fn patch_rejects_invalid_present_fields() {
        let cases = [
            (json!({ "title": "" }), "title"),
            (json!({ "description": "" }), "description"),
            (json!({ "authors": "dummy author" }), "authors"),
            (json!({ "authors": 1234 }), "authors"),
            (json!({ "authors": [] }), "authors"),
            (json!({ "authors": ["a", ""] }), "authors"),
            (json!({ "title": null }), "title"),
        ];
        for (body, field) in cases {
            let failure = validate_for_patch(&object(body.clone())).unwrap_err();
            assert_eq!(failure.message, PATCH_FAILURE);
            assert_eq!(rejected_fields(failure), vec![field], "body = {body}");
        }
    }
}
