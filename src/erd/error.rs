use std::collections::HashSet;

use thiserror::Error;

use super::types::{Canvas, Entity};

pub type Result<T> = std::result::Result<T, ErdError>;

#[derive(Debug, Error)]
pub enum ErdError {
    #[error("Duplicate entity name: {0}")]
    DuplicateEntityName(String),

    #[error("Invalid canvas size: {width}x{height}")]
    InvalidCanvas { width: f32, height: f32 },

    #[error("Entity file error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reject collections the algorithms cannot index unambiguously.
pub fn validate_entities(entities: &[Entity]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(entities.len());
    for entity in entities {
        if !seen.insert(entity.name.as_str()) {
            return Err(ErdError::DuplicateEntityName(entity.name.clone()));
        }
    }
    Ok(())
}

pub fn validate_canvas(canvas: Canvas) -> Result<()> {
    let ok = |v: f32| v.is_finite() && v >= 0.0;
    if ok(canvas.width) && ok(canvas.height) {
        Ok(())
    } else {
        Err(ErdError::InvalidCanvas {
            width: canvas.width,
            height: canvas.height,
        })
    }
}

/// Parse the `entities.json` format: an array of `{id, name, columns?, linkedEntities?}`.
pub fn parse_entities(json: &str) -> Result<Vec<Entity>> {
    Ok(serde_json::from_str(json)?)
}
