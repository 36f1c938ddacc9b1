use crate::model::{AttributeId, EntityRef};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Identifier already registered: {0}")]
    DuplicateIdentifier(String),

    #[error("Cannot make {parent} the parent of {node}: it is {node} itself or one of its descendants")]
    CyclicParent { node: EntityRef, parent: EntityRef },

    #[error("Not found: {0}")]
    EntityNotFound(EntityRef),

    #[error("{item} is not a member of {container}")]
    NotAMember { item: EntityRef, container: EntityRef },

    #[error("Value of {0} is locked by an ancestor attribute")]
    LockedValue(AttributeId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
