//! Layout documents and the single-line clipboard form that wraps them.
//!
//! A layout document is a JSON object keyed by column, then by row, whose
//! leaves are `[column, row, kind_code]` arrays. Only non-terrain cells are
//! exported. The clipboard form prefixes the base64 encoded document with the
//! grid dimensions: `gridwalk:v1:<W>x<H>:<payload>`.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use gridwalk_core::{CellCoord, CellKind, CellOverride};
use serde_json::Value;
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "gridwalk";
const SNAPSHOT_VERSION: &str = "v1";
const FIELD_DELIMITER: char = ':';

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const SNAPSHOT_HEADER: &str = "gridwalk:v1";

/// Cells of a grid captured for export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LayoutSnapshot {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) cells: Vec<CellOverride>,
}

impl LayoutSnapshot {
    /// Serialises the non-terrain cells as a layout document.
    pub(crate) fn to_json(&self) -> Result<String, LayoutTransferError> {
        let mut columns: BTreeMap<u32, BTreeMap<u32, [u32; 3]>> = BTreeMap::new();
        for entry in &self.cells {
            if entry.kind == CellKind::Terrain {
                continue;
            }
            let (column, row) = (entry.cell.column(), entry.cell.row());
            let _ = columns
                .entry(column)
                .or_default()
                .insert(row, [column, row, u32::from(entry.kind.code())]);
        }
        serde_json::to_string(&columns).map_err(LayoutTransferError::InvalidPayload)
    }

    /// Encodes the layout into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let encoded = STANDARD_NO_PAD.encode(self.to_json()?);
        Ok(format!(
            "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
            self.width, self.height
        ))
    }
}

/// Result of importing a layout document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ImportedLayout {
    /// Grid size carried by the clipboard form; raw documents carry none.
    pub(crate) dimensions: Option<(u32, u32)>,
    pub(crate) cells: Vec<CellOverride>,
    /// Entries that were dropped because they could not be interpreted.
    pub(crate) skipped: usize,
}

/// Errors that prevent anything from being loaded out of a layout string.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout payload was empty")]
    EmptyPayload,
    /// The clipboard form did not contain a version segment.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The clipboard form did not include grid dimensions.
    #[error("layout string is missing the grid dimensions")]
    MissingDimensions,
    /// The clipboard form did not include the payload segment.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The clipboard form used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload was not valid JSON.
    #[error("could not parse layout payload")]
    InvalidPayload(#[source] serde_json::Error),
    /// The payload was JSON but not an object keyed by column.
    #[error("layout document must be a JSON object")]
    NotAnObject,
}

/// Decodes either the clipboard form or a raw layout document.
pub(crate) fn decode(value: &str) -> Result<ImportedLayout, LayoutTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LayoutTransferError::EmptyPayload);
    }

    let Some(rest) = trimmed
        .strip_prefix(SNAPSHOT_DOMAIN)
        .and_then(|rest| rest.strip_prefix(FIELD_DELIMITER))
    else {
        return parse_document(trimmed.as_bytes());
    };

    let mut parts = rest.splitn(3, FIELD_DELIMITER);
    let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
    let dimensions = parts.next().ok_or(LayoutTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

    if version != SNAPSHOT_VERSION {
        return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
    }

    let dimensions = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LayoutTransferError::InvalidEncoding)?;
    let mut layout = parse_document(&bytes)?;
    layout.dimensions = Some(dimensions);
    Ok(layout)
}

fn parse_document(bytes: &[u8]) -> Result<ImportedLayout, LayoutTransferError> {
    let document: Value =
        serde_json::from_slice(bytes).map_err(LayoutTransferError::InvalidPayload)?;
    let Value::Object(columns) = document else {
        return Err(LayoutTransferError::NotAnObject);
    };

    let mut layout = ImportedLayout::default();
    for (column_key, rows) in &columns {
        let Value::Object(rows) = rows else {
            layout.skipped += 1;
            continue;
        };
        let Ok(column) = column_key.parse::<u32>() else {
            layout.skipped += rows.len();
            continue;
        };
        for (row_key, entry) in rows {
            match (row_key.parse::<u32>(), entry_kind(entry)) {
                (Ok(row), Some(kind)) => layout
                    .cells
                    .push(CellOverride::new(CellCoord::new(column, row), kind)),
                _ => layout.skipped += 1,
            }
        }
    }
    Ok(layout)
}

fn entry_kind(entry: &Value) -> Option<CellKind> {
    let code = entry.as_array()?.get(2)?.as_u64()?;
    CellKind::from_code(u8::try_from(code).ok()?)
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (width, height) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;

    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok((width, height))
}
