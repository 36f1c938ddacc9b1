//! Scripts are small code blocks carried by an object. They take no part in
//! either hierarchy.

use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::{ObjectId, Script, ScriptId};
use crate::store::Registry;

pub fn create(
    registry: &mut Registry,
    object: ObjectId,
    name: String,
    code: String,
) -> Result<ScriptId> {
    registry.objects.get(object)?;
    let id = registry.scripts.insert(Script::new(name, code, object));

    let owner = registry.objects.get_mut(object)?;
    owner.scripts.push(id);
    owner.changed = true;

    tracing::debug!(script = %id, %object, "created script");
    Ok(id)
}

pub fn rename(registry: &mut Registry, script: ScriptId, name: String) -> Result<CmdResult> {
    let record = registry.scripts.get_mut(script)?;
    record.name = name;
    record.changed = true;

    let mut result = CmdResult::default();
    result.touch(script);
    Ok(result)
}

pub fn set_code(registry: &mut Registry, script: ScriptId, code: String) -> Result<CmdResult> {
    let record = registry.scripts.get_mut(script)?;
    record.code = code;
    record.changed = true;

    let mut result = CmdResult::default();
    result.touch(script);
    Ok(result)
}

/// Deletes `script` and drops it from its owner's list.
pub fn delete(registry: &mut Registry, script: ScriptId) -> Result<CmdResult> {
    let owner = registry.scripts.get(script)?.object;

    let mut result = CmdResult::default();
    if let Some(owner) = owner {
        if let Ok(object) = registry.objects.get_mut(owner) {
            object.scripts.retain(|s| *s != script);
            object.changed = true;
            result.touch(owner);
        }
    }

    registry.scripts.remove(script);
    registry.note_removal();
    result.touch(script);
    Ok(result)
}
