use tracing::debug;

use crate::error::MalformedOutput;
use crate::extract::literal::LiteralValue;
use crate::filter::{DateRange, Filter, MAX_FILE_CONTENT};
use crate::TARGET_EXTRACT;

pub const REQUIRED_KEYS: [&str; 5] = ["year", "month", "day", "file_content", "file_type"];

/// Canonical form of a key written by the model: `'File Content'`,
/// `'file content'` and `'file-content'` all become `file_content`.
pub fn canonical_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Validate a parsed answer into a [`Filter`]. Any missing key or invalid
/// field rejects the whole answer.
pub fn normalize_filter(value: &LiteralValue) -> Result<Filter, MalformedOutput> {
    let LiteralValue::Map(entries) = value else {
        return Err(MalformedOutput::NotAMapping);
    };

    let field = |name: &'static str| -> Result<&LiteralValue, MalformedOutput> {
        entries
            .iter()
            .rev()
            .find(|(key, _)| canonical_key(key) == name)
            .map(|(_, value)| value)
            .ok_or(MalformedOutput::MissingKey(name))
    };

    // Check presence of every key before looking at any value.
    for name in REQUIRED_KEYS {
        field(name)?;
    }

    Ok(Filter {
        year: normalize_date_range("year", field("year")?)?,
        month: normalize_date_range("month", field("month")?)?,
        day: normalize_date_range("day", field("day")?)?,
        file_content: normalize_file_content(field("file_content")?)?,
        file_type: normalize_file_type(field("file_type")?)?,
    })
}

fn as_integer(field: &'static str, value: &LiteralValue) -> Result<i64, MalformedOutput> {
    match value {
        LiteralValue::Int(n) => Ok(*n),
        LiteralValue::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(*f as i64),
        LiteralValue::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| MalformedOutput::invalid(field, format!("'{}' is not an integer", s))),
        other => Err(MalformedOutput::invalid(
            field,
            format!("expected an integer, found {}", other.type_name()),
        )),
    }
}

pub fn normalize_date_range(
    field: &'static str,
    value: &LiteralValue,
) -> Result<DateRange, MalformedOutput> {
    let LiteralValue::List(items) = value else {
        return Err(MalformedOutput::invalid(
            field,
            format!("expected a list, found {}", value.type_name()),
        ));
    };

    match items.as_slice() {
        [] => Ok(DateRange::Unconstrained),
        [start, end] => {
            let start = as_integer(field, start)?;
            let end = as_integer(field, end)?;
            match (start, end) {
                (-1, -1) => Ok(DateRange::Unknown),
                (0, 0) => Ok(DateRange::Latest),
                (start, end) if start < 0 || end < 0 => Err(MalformedOutput::invalid(
                    field,
                    format!("negative value in [{}, {}]", start, end),
                )),
                (start, end) if start > end => {
                    Err(MalformedOutput::ReversedRange { field, start, end })
                }
                (start, end) => Ok(DateRange::Between { start, end }),
            }
        }
        other => Err(MalformedOutput::invalid(
            field,
            format!("expected 0 or 2 elements, found {}", other.len()),
        )),
    }
}

/// Strings of a list field; a bare scalar counts as a one-element list.
fn string_items(field: &'static str, value: &LiteralValue) -> Result<Vec<String>, MalformedOutput> {
    let items = match value {
        LiteralValue::List(items) => items.as_slice(),
        scalar => std::slice::from_ref(scalar),
    };
    items
        .iter()
        .map(|item| match item {
            LiteralValue::Str(s) => Ok(s.clone()),
            LiteralValue::Int(n) => Ok(n.to_string()),
            LiteralValue::Float(f) => Ok(f.to_string()),
            other => Err(MalformedOutput::invalid(
                field,
                format!("expected text, found {}", other.type_name()),
            )),
        })
        .collect()
}

pub fn normalize_file_content(value: &LiteralValue) -> Result<Vec<String>, MalformedOutput> {
    let mut content = string_items("file_content", value)?;
    if content.len() > MAX_FILE_CONTENT {
        debug!(target: TARGET_EXTRACT, "Dropping {} file content entries beyond the first {}", content.len() - MAX_FILE_CONTENT, MAX_FILE_CONTENT);
        content.truncate(MAX_FILE_CONTENT);
    }
    Ok(content)
}

pub fn normalize_file_type(value: &LiteralValue) -> Result<Vec<String>, MalformedOutput> {
    let types = string_items("file_type", value)?
        .into_iter()
        .filter_map(|raw| {
            let extension = raw.trim().trim_start_matches('.').to_lowercase();
            if !extension.is_empty() && extension.chars().all(|c| c.is_ascii_alphanumeric()) {
                Some(extension)
            } else {
                debug!(target: TARGET_EXTRACT, "Dropping invalid file type {:?}", raw);
                None
            }
        })
        .collect();
    Ok(types)
}
