//! Session snapshots: serialisation, defensive normalisation, import/export.
//!
//! The on-disk shape is a single JSON object:
//!
//! ```json
//! { "round": 1, "activeId": "…", "combatants": [ … ], "log": [ … ],
//!   "logOpen": false, "autoSort": false }
//! ```
//!
//! Reading never trusts the payload. Every field is coerced and clamped, and
//! anything unusable falls back to its default instead of failing the load.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::SnapshotError;
use crate::core::session::{
    clamp_duration, CombatSession, Combatant, CombatantId, ConditionCatalog, ConditionInstance,
    ConditionTracker, Encounter, EventLog, ResourceField, StatBlock, ROUND_MAX, UNNAMED,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    round: u32,
    active_id: Option<&'a CombatantId>,
    combatants: &'a [Combatant],
    log: &'a EventLog,
    log_open: bool,
    auto_sort: bool,
}

impl<'a> SnapshotRef<'a> {
    fn of(session: &'a CombatSession) -> Self {
        let encounter = session.encounter();
        Self {
            round: encounter.round(),
            active_id: encounter.active_id(),
            combatants: encounter.combatants(),
            log: session.log(),
            log_open: session.log_open(),
            auto_sort: encounter.auto_sort(),
        }
    }
}

/// Compact JSON, as written to the session store.
pub fn to_json(session: &CombatSession) -> Result<String, SnapshotError> {
    serde_json::to_string(&SnapshotRef::of(session)).map_err(SnapshotError::Serialize)
}

/// Human-readable JSON, as written by export.
pub fn to_json_pretty(session: &CombatSession) -> Result<String, SnapshotError> {
    serde_json::to_string_pretty(&SnapshotRef::of(session)).map_err(SnapshotError::Serialize)
}

/// Startup load of a stored snapshot. Fails only when the text is not a
/// JSON object; everything else is normalised.
pub fn try_restore(text: &str) -> Result<CombatSession, SnapshotError> {
    let session = normalize(&parse_object(text)?);
    tracing::info!(
        combatants = session.encounter().len(),
        round = session.encounter().round(),
        "session restored"
    );
    Ok(session)
}

/// Like [`try_restore`], but an unreadable snapshot yields a fresh session.
pub fn restore(text: &str) -> CombatSession {
    try_restore(text).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "stored session unreadable, starting fresh");
        CombatSession::new()
    })
}

/// Import a user-supplied export. Only a payload that is not a JSON object
/// at all is refused; a successful import closes every details panel and
/// narrates the load.
pub fn import(text: &str) -> Result<CombatSession, SnapshotError> {
    let object = parse_object(text)?;
    let mut session = normalize(&object);
    session.collapse_all();
    session.mark_loaded();

    tracing::info!(combatants = session.encounter().len(), "combat imported");
    Ok(session)
}

pub fn export_to(session: &CombatSession, path: &Path) -> Result<(), SnapshotError> {
    let text = to_json_pretty(session)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SnapshotError::io(parent, e))?;
    }
    std::fs::write(path, text).map_err(|e| SnapshotError::io(path, e))?;
    tracing::info!(path = %path.display(), "combat exported");
    Ok(())
}

pub fn import_from(path: &Path) -> Result<CombatSession, SnapshotError> {
    let text = std::fs::read_to_string(path).map_err(|e| SnapshotError::io(path, e))?;
    import(&text)
}

fn parse_object(text: &str) -> Result<Map<String, Value>, SnapshotError> {
    match serde_json::from_str::<Value>(text).map_err(SnapshotError::Parse)? {
        Value::Object(object) => Ok(object),
        other => Err(SnapshotError::NotAnObject {
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Normalisation
// ============================================================================

fn normalize(object: &Map<String, Value>) -> CombatSession {
    let round = coerce_int(object.get("round"))
        .map(|r| r.clamp(1, ROUND_MAX as i64) as u32)
        .unwrap_or(1);
    let auto_sort = coerce_bool(object.get("autoSort"));
    let log_open = coerce_bool(object.get("logOpen"));

    let log = match object.get("log") {
        Some(Value::Array(lines)) => EventLog::from_lines(
            lines
                .iter()
                .filter_map(|line| line.as_str().map(str::to_string)),
        ),
        _ => EventLog::new(),
    };

    let mut seen = HashSet::new();
    let combatants: Vec<Combatant> = match object.get("combatants") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(|raw| normalize_combatant(raw, &mut seen))
            .collect(),
        _ => Vec::new(),
    };

    let active_id = object
        .get("activeId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(CombatantId::from);

    let encounter = Encounter::from_parts(round, active_id, combatants, auto_sort);
    CombatSession::from_parts(encounter, log, log_open)
}

fn normalize_combatant(raw: &Map<String, Value>, seen: &mut HashSet<CombatantId>) -> Combatant {
    let id = match raw.get("id").and_then(coerce_text).map(CombatantId::from) {
        Some(id) if !id.as_str().trim().is_empty() && !seen.contains(&id) => id,
        Some(id) => {
            let fresh = CombatantId::generate();
            tracing::warn!(old = %id, new = %fresh, "blank or duplicate combatant id replaced");
            fresh
        }
        None => CombatantId::generate(),
    };
    seen.insert(id.clone());

    let name = raw
        .get("name")
        .and_then(coerce_text)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| UNNAMED.to_string());

    let init = coerce_int(raw.get("init"))
        .map(|i| i.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
        .unwrap_or(0);

    let hp_cur = coerce_int(raw.get("hpCur")).map_or(0, |v| ResourceField::HpCurrent.clamp(v));
    let mp_cur = coerce_int(raw.get("mpCur")).map_or(0, |v| ResourceField::MpCurrent.clamp(v));
    let hp_max = coerce_int(raw.get("hpMax"))
        .map_or(hp_cur.max(0), |v| ResourceField::HpMaximum.clamp(v));
    let mp_max = coerce_int(raw.get("mpMax"))
        .map_or(mp_cur.max(0), |v| ResourceField::MpMaximum.clamp(v));

    let stats = match raw.get("stats") {
        Some(Value::Object(s)) => StatBlock {
            defense: s.get("def").and_then(coerce_text).unwrap_or_default(),
            resistances: s.get("res").and_then(coerce_text).unwrap_or_default(),
            difficulty_class: s.get("cd").and_then(coerce_text).unwrap_or_default(),
        },
        _ => StatBlock::default(),
    };

    let conditions = match raw.get("conditions") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(normalize_condition)
            .collect(),
        _ => Vec::new(),
    };

    Combatant {
        id,
        name,
        init,
        hp_cur,
        hp_max,
        mp_cur,
        mp_max,
        notes: raw.get("notes").and_then(coerce_text).unwrap_or_default(),
        stats,
        conditions: ConditionTracker::from_instances(conditions),
        open: coerce_bool(raw.get("open")),
    }
}

fn normalize_condition(raw: &Map<String, Value>) -> Option<ConditionInstance> {
    let name = raw.get("name").and_then(coerce_text)?.trim().to_string();
    if name.is_empty() {
        return None;
    }
    if !ConditionCatalog::tormenta20().is_known(&name) {
        tracing::warn!(condition = %name, "keeping condition missing from the catalog");
    }
    let remaining = clamp_duration(coerce_int(raw.get("remaining")));
    Some(ConditionInstance::new(name, remaining))
}

// ============================================================================
// Coercion
// ============================================================================

/// Integer view of a JSON value: numbers are truncated, strings are read up
/// to the first non-digit (`"12abc"` → 12). Everything else is `None`.
fn coerce_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

fn leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Overlong digit runs saturate rather than fail.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
