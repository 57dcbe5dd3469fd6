//! Rendering dependency records as manifest values

use toml_edit::{value, Array, InlineTable, Item};

use crate::requirement::DependencyRecord;

/// Version clause for a `project.dependencies` string.
///
/// - a version that already starts with an operator (`>`, `<`, `=`, `!`, `^`,
///   `~`) is used as is
/// - a version containing `==` is rendered as `==<version>`
/// - a bare version becomes a lower bound, `>=<version>`
pub fn version_clause(version: &str) -> String {
    let version = version.trim();
    if version.starts_with(['>', '<', '=', '!', '^', '~']) {
        version.to_string()
    } else if version.contains("==") {
        format!("=={}", version.replace("==", ""))
    } else {
        format!(">={}", version)
    }
}

/// Render a record as a `project.dependencies` entry, e.g.
/// `requests[socks] (>=2.31); python_version < "3.12"`.
///
/// Returns `None` when the record has no version.
pub fn array_entry(record: &DependencyRecord) -> Option<String> {
    let version = record.version.as_deref()?;

    let mut entry = record.name.clone();
    if !record.extras.is_empty() {
        entry.push('[');
        entry.push_str(&record.extras.join(","));
        entry.push(']');
    }
    entry.push_str(&format!(" ({})", version_clause(version)));
    if let Some(markers) = &record.markers {
        entry.push_str("; ");
        entry.push_str(markers);
    }
    Some(entry)
}

/// Render a record as the value of a `name = ...` entry in a dependency table.
///
/// Records with extras, markers, a URL or a VCS reference become an inline
/// table; a plain versioned record becomes a version string. Returns `None`
/// for a record with nothing to write besides its name.
pub fn table_entry(record: &DependencyRecord) -> Option<Item> {
    if record.has_details() {
        let mut inline = InlineTable::new();
        if let Some(version) = &record.version {
            inline.insert("version", version.as_str().into());
        }
        if !record.extras.is_empty() {
            let extras: Array = record.extras.iter().map(String::as_str).collect();
            inline.insert("extras", extras.into());
        }
        if let Some(markers) = &record.markers {
            inline.insert("markers", markers.replace('"', "'").into());
        }
        if let Some(git) = &record.git {
            inline.insert("git", git.as_str().into());
            if let Some(rev) = &record.rev {
                inline.insert("rev", rev.as_str().into());
            }
        }
        if let Some(url) = &record.url {
            inline.insert("url", url.as_str().into());
        }
        inline.fmt();
        return Some(value(inline));
    }

    record.version.as_deref().map(value)
}

/// Rewrite quoted group table headers to their dotted form:
/// `"group.dev.dependencies"` becomes `group.dev.dependencies`.
pub fn unquote_group_headers<'a>(
    text: &str,
    groups: impl IntoIterator<Item = &'a str>,
) -> String {
    let mut text = text.to_string();
    for group in groups {
        let quoted = format!("\"group.{}.dependencies\"", group);
        if text.contains(&quoted) {
            text = text.replace(&quoted, &format!("group.{}.dependencies", group));
        }
    }
    text
}
