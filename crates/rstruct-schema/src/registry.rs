use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SchemaError;
use crate::field::{FieldDef, FieldSpec};
use crate::schema::Schema;

/// Named schemas compiled in dependency order.
///
/// Schemas that arrive as data (a manifest file, a config section) name
/// their nested schemas instead of holding them. The registry resolves
/// those names against what it has compiled so far, so definitions must
/// be registered bottom-up: `Point` before the `PolyHeader` that embeds
/// it. A forward reference, and therefore any cycle, fails with
/// [`SchemaError::UnresolvedNested`].
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
    order: Vec<String>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and register a schema.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::DuplicateSchema`] if `name` is already registered.
    /// - [`SchemaError::UnresolvedNested`] if a nested reference names a
    ///   schema that is not registered yet.
    /// - Any error from [`Schema::compile`].
    pub fn register(&mut self, name: &str, fields: &[FieldDef]) -> Result<Arc<Schema>, SchemaError> {
        if self.schemas.contains_key(name) {
            return Err(SchemaError::DuplicateSchema {
                name: name.to_string(),
            });
        }

        let specs = fields
            .iter()
            .map(|def| match def {
                FieldDef::Scalar { name: field, format } => {
                    Ok(FieldSpec::scalar(format.as_str(), field.as_str()))
                }
                FieldDef::Nested {
                    name: field,
                    schema: target,
                } => self
                    .schemas
                    .get(target)
                    .map(|nested| FieldSpec::nested(nested, field.as_str()))
                    .ok_or_else(|| SchemaError::UnresolvedNested {
                        schema: name.to_string(),
                        field: field.clone(),
                        target: target.clone(),
                    }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let schema = Schema::compile(name, &specs)?;
        self.insert(Arc::clone(&schema))?;
        Ok(schema)
    }

    /// Register a schema compiled elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateSchema`] if the name is taken.
    pub fn insert(&mut self, schema: Arc<Schema>) -> Result<(), SchemaError> {
        let name = schema.name().to_string();
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::DuplicateSchema { name });
        }
        self.order.push(name.clone());
        self.schemas.insert(name, schema);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Schemas in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.order.iter().filter_map(|name| self.schemas.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_fields() -> Vec<FieldDef> {
        vec![FieldDef::scalar("<d", "x"), FieldDef::scalar("d", "y")]
    }

    #[test]
    fn resolves_nested_by_name() {
        let mut registry = SchemaRegistry::new();
        registry.register("Point", &point_fields()).unwrap();
        let header = registry
            .register(
                "PolyHeader",
                &[
                    FieldDef::scalar("<i", "file_code"),
                    FieldDef::nested("Point", "min"),
                    FieldDef::nested("Point", "max"),
                    FieldDef::scalar("i", "num_polys"),
                ],
            )
            .unwrap();

        assert_eq!(header.total_size(), 40);
        let names: Vec<_> = registry.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["Point", "PolyHeader"]);
    }

    #[test]
    fn forward_reference_is_unresolved() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .register("Outer", &[FieldDef::nested("Inner", "inner")])
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnresolvedNested {
                schema: "Outer".into(),
                field: "inner".into(),
                target: "Inner".into(),
            }
        );
        assert!(registry.is_empty(), "failed schema must not be registered");
    }

    #[test]
    fn self_reference_is_unresolved() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .register("Node", &[FieldDef::scalar("i", "v"), FieldDef::nested("Node", "next")])
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedNested { .. }));
    }

    #[test]
    fn duplicate_schema_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register("Point", &point_fields()).unwrap();
        let err = registry.register("Point", &point_fields()).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateSchema { name: "Point".into() });
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn insert_precompiled() {
        let mut registry = SchemaRegistry::new();
        let schema = Schema::compile("Pair", &[FieldSpec::scalar("<H", "a"), FieldSpec::scalar("H", "b")]).unwrap();
        registry.insert(schema).unwrap();
        assert!(registry.contains("Pair"));
        assert_eq!(registry.get("Pair").unwrap().total_size(), 4);
    }
}
