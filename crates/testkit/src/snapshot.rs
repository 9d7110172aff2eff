//! Golden-file snapshots of catalog state.
//!
//! Values are serialized as pretty JSON with object keys sorted, so the file
//! only changes when the data does. Rerun with `ITEMDEX_UPDATE_SNAPSHOTS=1` to
//! rewrite the goldens.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Environment variable that enables snapshot updates.
pub const UPDATE_SNAPSHOTS_ENV: &str = "ITEMDEX_UPDATE_SNAPSHOTS";

/// Assert that `value` matches the JSON snapshot stored at `path`.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = canonical_json(value)?;

    if should_update_snapshots() {
        write_snapshot(path, &actual)?;
        return Ok(());
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "snapshot missing at {} (run with {}=1 to create it)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        )
    })?;

    if expected.replace("\r\n", "\n") != actual {
        anyhow::bail!(
            "snapshot mismatch at {} (run with {}=1 to update)\n--- expected\n{}--- actual\n{}",
            path.display(),
            UPDATE_SNAPSHOTS_ENV,
            expected,
            actual
        );
    }

    Ok(())
}

/// Sorted-key pretty JSON for `value`, newline terminated.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("failed to serialize snapshot value")?;
    let mut s = serde_json::to_string_pretty(&canonicalize_value(value))
        .context("failed to format snapshot JSON")?;
    s.push('\n');
    Ok(s)
}

fn should_update_snapshots() -> bool {
    matches!(
        std::env::var(UPDATE_SNAPSHOTS_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn write_snapshot(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create snapshot directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write snapshot {}", path.display()))
}

fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                out.insert(k, canonicalize_value(v));
            }
            Value::Object(out)
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fluid, item};
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn canonical_json_sorts_keys() {
        let json = canonical_json(&vec![item("stone").with_amount(3)]).unwrap();
        let amount = json.find("\"amount\"").unwrap();
        let key = json.find("\"key\"").unwrap();
        let kind = json.find("\"kind\"").unwrap();
        assert!(amount < key && key < kind);
        assert!(json.contains("\"minecraft:stone\""));
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn snapshot_matches_written_file() {
        let path = std::env::temp_dir().join(format!(
            "itemdex-snapshot-{}.json",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let stacks = vec![item("stone"), fluid("water")];
        fs::write(&path, canonical_json(&stacks).unwrap()).unwrap();

        assert_json_snapshot(&path, &stacks).unwrap();
        assert!(assert_json_snapshot(&path, &vec![item("dirt")]).is_err());
        let _ = fs::remove_file(&path);
    }
}
