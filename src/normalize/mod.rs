use serde_json::Value;
use thiserror::Error;

use crate::model::{Collection, Record};
use crate::source::{RawPayload, StoredDocument};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("invalid structure for {collection}")]
    InvalidStructure { collection: Collection },

    #[error("invalid record #{index} for {collection}: {message}")]
    InvalidRecord {
        collection: Collection,
        index: usize,
        message: String,
    },
}

impl SchemaError {
    pub fn collection(&self) -> Collection {
        match self {
            Self::InvalidStructure { collection } => *collection,
            Self::InvalidRecord { collection, .. } => *collection,
        }
    }
}

/// Resolves any accepted payload shape into records, preserving order.
///
/// Accepted: a bare array, an object holding the array under one of the
/// collection's payload keys, or a document set. Anything else is a
/// `SchemaError`; no partial result is ever returned.
pub fn normalize(payload: RawPayload, collection: Collection) -> Result<Vec<Record>, SchemaError> {
    let items = match payload {
        RawPayload::Json(value) => resolve_items(value, collection)?,
        RawPayload::Documents(value) => resolve_documents(value, collection)?
            .into_iter()
            .enumerate()
            .map(|(index, item)| to_document(item, collection, index).map(merge_document))
            .collect::<Result<Vec<_>, _>>()?,
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| to_record(item, collection, index))
        .collect()
}

fn resolve_items(value: Value, collection: Collection) -> Result<Vec<Value>, SchemaError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            let wrapped = collection
                .payload_keys()
                .iter()
                .find_map(|key| map.remove(*key));
            match wrapped {
                Some(Value::Array(items)) => Ok(items),
                _ => Err(SchemaError::InvalidStructure { collection }),
            }
        }
        _ => Err(SchemaError::InvalidStructure { collection }),
    }
}

fn resolve_documents(value: Value, collection: Collection) -> Result<Vec<Value>, SchemaError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("documents") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(SchemaError::InvalidStructure { collection }),
        },
        _ => Err(SchemaError::InvalidStructure { collection }),
    }
}

fn to_document(
    item: Value,
    collection: Collection,
    index: usize,
) -> Result<StoredDocument, SchemaError> {
    serde_json::from_value(item).map_err(|e| SchemaError::InvalidRecord {
        collection,
        index,
        message: e.to_string(),
    })
}

fn merge_document(document: StoredDocument) -> Value {
    let StoredDocument { id, mut fields } = document;
    fields.insert("id".to_string(), Value::String(id));
    Value::Object(fields)
}

fn to_record(item: Value, collection: Collection, index: usize) -> Result<Record, SchemaError> {
    if !item.is_object() {
        return Err(SchemaError::InvalidRecord {
            collection,
            index,
            message: "expected an object".to_string(),
        });
    }
    serde_json::from_value(item).map_err(|e| SchemaError::InvalidRecord {
        collection,
        index,
        message: e.to_string(),
    })
}
