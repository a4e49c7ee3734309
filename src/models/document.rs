use bson::{Bson, Document};

use crate::error::MigrationError;

/// Short label used to point at a document in logs and errors.
pub fn document_label(doc: &Document) -> String {
    match doc.get("_id") {
        Some(id) => id.to_string(),
        None => "<no _id>".to_string(),
    }
}

/// Read a required string field, failing on a missing or mistyped value.
pub fn required_str<'a>(doc: &'a Document, field: &str) -> Result<&'a str, MigrationError> {
    match doc.get(field) {
        Some(Bson::String(value)) => Ok(value.as_str()),
        Some(other) => Err(MigrationError::invalid_document(
            document_label(doc),
            format!("field `{field}` is {:?}, expected a string", other.element_type()),
        )),
        None => Err(MigrationError::invalid_document(
            document_label(doc),
            format!("missing field `{field}`"),
        )),
    }
}

/// True when `field` holds a non-empty string.
pub fn has_non_empty_str(doc: &Document, field: &str) -> bool {
    matches!(doc.get(field), Some(Bson::String(value)) if !value.is_empty())
}
