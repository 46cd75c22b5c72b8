/// JSON schema manifests.
///
/// A manifest lists schemas bottom-up; a nested field names a schema
/// defined earlier in the same file.
///
/// ```json
/// {
///   "schemas": [
///     {
///       "name": "Point",
///       "fields": [
///         { "name": "x", "format": "<d" },
///         { "name": "y", "format": "d" }
///       ]
///     },
///     {
///       "name": "PolyHeader",
///       "fields": [
///         { "name": "file_code", "format": "<i" },
///         { "name": "min",       "nested": "Point" },
///         { "name": "max",       "nested": "Point" },
///         { "name": "num_polys", "format": "i" }
///       ]
///     }
///   ]
/// }
/// ```
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use rstruct_schema::{FieldDef, Schema, SchemaRegistry};

// ── Manifest serde types ──────────────────────────────────────────────────────

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    schemas: Vec<ManifestSchema>,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestSchema {
    name: String,
    fields: Vec<ManifestField>,
}

/// One field entry. Exactly one of `format` / `nested` is present.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ManifestField {
    Scalar { name: String, format: String },
    Nested { name: String, nested: String },
}

impl From<ManifestField> for FieldDef {
    fn from(field: ManifestField) -> Self {
        match field {
            ManifestField::Scalar { name, format } => FieldDef::scalar(format, name),
            ManifestField::Nested { name, nested } => FieldDef::nested(nested, name),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Parse manifest JSON and compile every schema in file order.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or any schema fails to
/// compile (bad format string, duplicate field, forward reference).
pub fn parse(src: &str) -> Result<SchemaRegistry> {
    let manifest: Manifest = serde_json::from_str(src).context("malformed manifest")?;

    let mut registry = SchemaRegistry::new();
    for schema in manifest.schemas {
        let fields: Vec<FieldDef> = schema.fields.into_iter().map(FieldDef::from).collect();
        registry
            .register(&schema.name, &fields)
            .with_context(|| format!("schema {}", schema.name))?;
    }
    Ok(registry)
}

/// Read and compile a manifest file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or as [`parse`].
pub fn load(path: &Path) -> Result<SchemaRegistry> {
    let src = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let registry =
        parse(&src).with_context(|| format!("failed to load manifest {}", path.display()))?;
    tracing::debug!(path = %path.display(), schemas = registry.len(), "loaded manifest");
    Ok(registry)
}

/// Look up `name`, listing the known schemas when it is missing.
///
/// # Errors
///
/// Returns an error if `registry` has no schema called `name`.
pub fn lookup<'r>(registry: &'r SchemaRegistry, name: &str) -> Result<&'r Arc<Schema>> {
    registry.get(name).ok_or_else(|| {
        let known: Vec<&str> = registry.iter().map(|s| s.name()).collect();
        anyhow!("no schema named {name:?} (manifest defines: {})", known.join(", "))
    })
}
