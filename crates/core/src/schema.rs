//! Collection schema derivation
//!
//! The vector service only stores 64-bit scalars and float vectors, so a
//! collection always carries four key fields before any vector data:
//! the synthetic row key (primary), then the three identifier parts.
//! Vector fields follow, sorted by name so the schema is identical no
//! matter what order the fields were declared in.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};
use crate::field::VectorFieldSpec;

/// Name of the synthetic primary-key field
pub const ROW_KEY_FIELD: &str = "row_key";

/// Name of the field holding the top 2 identifier bits
pub const PK_HIGH_FIELD: &str = "pk_high";

/// Name of the field holding the middle 63 identifier bits
pub const PK_MID_FIELD: &str = "pk_mid";

/// Name of the field holding the bottom 63 identifier bits
pub const PK_LOW_FIELD: &str = "pk_low";

/// Storage type of one collection field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// Signed 64-bit scalar
    Int64,
    /// Fixed-dimensionality float vector
    FloatVector {
        /// Dimensionality of the vector
        dim: usize,
    },
}

/// One field of a collection schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Storage type
    pub ty: FieldType,
    /// Whether this is the collection's primary key
    pub primary: bool,
}

impl FieldDef {
    fn int64(name: &str, primary: bool) -> Self {
        FieldDef {
            name: name.to_string(),
            ty: FieldType::Int64,
            primary,
        }
    }
}

/// Ordered field list of a vector-service collection
///
/// Field order and types must match exactly between this declaration and
/// the live collection; mismatches are detected before writes, never
/// migrated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Collection name
    pub name: String,
    /// Fields in storage order: four key fields, then vector fields
    /// sorted by name
    pub fields: Vec<FieldDef>,
}

impl CollectionSchema {
    /// Field names in storage order
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// The vector fields of this schema, in storage order
    pub fn vector_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields
            .iter()
            .filter(|f| matches!(f.ty, FieldType::FloatVector { .. }))
    }
}

/// Derives a [`CollectionSchema`] from an entity type's declared vector fields
///
/// Pure; no side effects. The same set of specs produces the same schema
/// regardless of declaration order.
pub struct SchemaBuilder;

impl SchemaBuilder {
    /// Build the schema for a collection
    ///
    /// # Errors
    /// `Configuration` if two specs share a name, a spec reuses one of the
    /// reserved key-field names, or a spec fails its own validation.
    pub fn build(collection: &str, specs: &[VectorFieldSpec]) -> BridgeResult<CollectionSchema> {
        if collection.is_empty() {
            return Err(BridgeError::Configuration {
                detail: "collection name cannot be empty".to_string(),
            });
        }

        let reserved = [ROW_KEY_FIELD, PK_HIGH_FIELD, PK_MID_FIELD, PK_LOW_FIELD];
        let mut sorted: Vec<&VectorFieldSpec> = specs.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        for pair in sorted.windows(2) {
            if pair[0].name == pair[1].name {
                return Err(BridgeError::Configuration {
                    detail: format!("duplicate vector field '{}'", pair[0].name),
                });
            }
        }

        let mut fields = vec![
            FieldDef::int64(ROW_KEY_FIELD, true),
            FieldDef::int64(PK_HIGH_FIELD, false),
            FieldDef::int64(PK_MID_FIELD, false),
            FieldDef::int64(PK_LOW_FIELD, false),
        ];
        for spec in sorted {
            spec.validate()?;
            if reserved.contains(&spec.name.as_str()) {
                return Err(BridgeError::Configuration {
                    detail: format!("vector field '{}' uses a reserved name", spec.name),
                });
            }
            fields.push(FieldDef {
                name: spec.name.clone(),
                ty: FieldType::FloatVector { dim: spec.dim },
                primary: false,
            });
        }

        Ok(CollectionSchema {
            name: collection.to_string(),
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_fields_come_first() {
        let schema = SchemaBuilder::build("product", &[VectorFieldSpec::new("similarity", 2)])
            .unwrap();
        assert_eq!(
            schema.field_names(),
            vec!["row_key", "pk_high", "pk_mid", "pk_low", "similarity"]
        );
        assert!(schema.fields[0].primary);
        assert!(!schema.fields[4].primary);
        assert_eq!(schema.fields[4].ty, FieldType::FloatVector { dim: 2 });
    }

    #[test]
    fn test_declaration_order_does_not_matter() {
        let a = VectorFieldSpec::new("alpha", 4);
        let b = VectorFieldSpec::new("beta", 8);
        let c = VectorFieldSpec::new("gamma", 16);

        let forward =
            SchemaBuilder::build("product", &[a.clone(), b.clone(), c.clone()]).unwrap();
        let reversed = SchemaBuilder::build("product", &[c, b, a]).unwrap();
        assert_eq!(forward, reversed);
        assert_eq!(
            forward.field_names()[4..],
            ["alpha".to_string(), "beta".to_string(), "gamma".to_string()]
        );
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = SchemaBuilder::build(
            "product",
            &[
                VectorFieldSpec::new("similarity", 2),
                VectorFieldSpec::new("similarity", 4),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, BridgeError::Configuration { .. }));
    }

    #[test]
    fn test_zero_dim_rejected() {
        let err =
            SchemaBuilder::build("product", &[VectorFieldSpec::new("similarity", 0)]).unwrap_err();
        assert!(matches!(err, BridgeError::Configuration { .. }));
    }

    #[test]
    fn test_reserved_name_rejected() {
        let err =
            SchemaBuilder::build("product", &[VectorFieldSpec::new("row_key", 2)]).unwrap_err();
        assert!(matches!(err, BridgeError::Configuration { .. }));
    }

    #[test]
    fn test_vector_fields_iterator() {
        let schema = SchemaBuilder::build(
            "product",
            &[
                VectorFieldSpec::new("b_field", 2),
                VectorFieldSpec::new("a_field", 3),
            ],
        )
        .unwrap();
        let names: Vec<&str> = schema.vector_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a_field", "b_field"]);
    }
}
