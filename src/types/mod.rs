//! # Type Cast Registry
//!
//! Resolves column types into converters that turn storage values into
//! application values.
//!
//! ## Key Components
//!
//! - [`TypeConverter`] - one conversion (`to_application_value`)
//! - [`TypeRegistry`] - converters indexed by type name, with the built-in set
//! - [`CastMap`] - converters resolved for every column of one table alias
//!
//! Cast maps are resolved once per alias while a hydration plan is built, so
//! grouping a row never touches the registry.

pub mod converters;

use crate::error::{HydrationError, Result};
use crate::schema::TableSchema;
use crate::value::{Fields, Value};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

pub use converters::{
    BoolType, DateTimeType, DateType, DecimalType, FloatType, IntegerType, JsonType, StringType,
    TimeType, UuidType,
};

/// Converts a storage value into its application value.
pub trait TypeConverter: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn to_application_value(&self, raw: Value) -> std::result::Result<Value, String>;
}

/// Converters indexed by column type name.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    converters: HashMap<String, Arc<dyn TypeConverter>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TypeRegistry {
    /// Registry with no converters at all.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Registry pre-loaded with the built-in column types.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        let integer: Arc<dyn TypeConverter> = Arc::new(IntegerType);
        let string: Arc<dyn TypeConverter> = Arc::new(StringType);
        let datetime: Arc<dyn TypeConverter> = Arc::new(DateTimeType);

        registry.register_shared("integer", integer.clone());
        registry.register_shared("biginteger", integer.clone());
        registry.register_shared("smallinteger", integer);
        registry.register("float", FloatType);
        registry.register("decimal", DecimalType);
        registry.register("boolean", BoolType);
        registry.register_shared("string", string.clone());
        registry.register_shared("text", string);
        registry.register("uuid", UuidType);
        registry.register("date", DateType);
        registry.register_shared("datetime", datetime.clone());
        registry.register_shared("timestamp", datetime);
        registry.register("time", TimeType);
        registry.register("json", JsonType);
        registry
    }

    pub fn register(&mut self, type_name: &str, converter: impl TypeConverter + 'static) {
        self.register_shared(type_name, Arc::new(converter));
    }

    pub fn register_shared(&mut self, type_name: &str, converter: Arc<dyn TypeConverter>) {
        self.converters.insert(type_name.to_string(), converter);
    }

    /// Build the converter for a type name.
    pub fn build(&self, type_name: &str) -> Option<Arc<dyn TypeConverter>> {
        self.converters.get(type_name).cloned()
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.converters.contains_key(type_name)
    }

    /// Converter for one column of a table.
    ///
    /// Returns `Ok(None)` for columns the schema does not know about; those
    /// values pass through unconverted.
    pub fn type_for(
        &self,
        schema: &TableSchema,
        column: &str,
    ) -> Result<Option<Arc<dyn TypeConverter>>> {
        let Some(type_name) = schema.column_type(column) else {
            return Ok(None);
        };

        self.build(type_name)
            .map(Some)
            .ok_or_else(|| HydrationError::UnknownType {
                table: schema.name().to_string(),
                column: column.to_string(),
                type_name: type_name.to_string(),
            })
    }

    /// Resolve converters for every column of a table schema.
    pub fn cast_map(&self, schema: &TableSchema) -> Result<CastMap> {
        let mut converters = HashMap::with_capacity(schema.columns().len());
        for column in schema.columns() {
            if let Some(converter) = self.type_for(schema, &column.name)? {
                converters.insert(column.name.clone(), converter);
            }
        }

        Ok(CastMap {
            table: schema.name().to_string(),
            converters,
        })
    }
}

/// Converters for the columns of one table alias.
#[derive(Debug, Clone)]
pub struct CastMap {
    table: String,
    converters: HashMap<String, Arc<dyn TypeConverter>>,
}

impl CastMap {
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Convert every known field in place; unknown fields are left untouched.
    pub fn cast(&self, mut values: Fields) -> Result<Fields> {
        for (field, value) in values.iter_mut() {
            let Some(converter) = self.converters.get(field) else {
                continue;
            };

            let raw = std::mem::replace(value, Value::Null);
            *value = converter.to_application_value(raw).map_err(|message| {
                HydrationError::TypeConversion {
                    table: self.table.clone(),
                    column: field.clone(),
                    type_name: converter.name().to_string(),
                    message,
                }
            })?;
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::fields;

    fn articles() -> TableSchema {
        TableSchema::new("Articles")
            .column("id", "integer")
            .column("published", "boolean")
    }

    #[test]
    fn test_cast_map_converts_known_columns_only() {
        let casts = TypeRegistry::with_defaults().cast_map(&articles()).unwrap();
        let row = casts
            .cast(fields([
                ("id", Value::from("7")),
                ("published", Value::from("1")),
                ("computed", Value::from("raw")),
            ]))
            .unwrap();

        assert_eq!(row["id"], Value::Integer(7));
        assert_eq!(row["published"], Value::Bool(true));
        assert_eq!(row["computed"], Value::from("raw"));
    }

    #[test]
    fn test_unknown_type_is_reported_once_at_resolution() {
        let schema = TableSchema::new("Points").column("location", "geometry");
        let error = TypeRegistry::with_defaults().cast_map(&schema).unwrap_err();
        assert!(matches!(error, HydrationError::UnknownType { .. }));
    }

    #[test]
    fn test_conversion_error_names_the_column() {
        let casts = TypeRegistry::with_defaults().cast_map(&articles()).unwrap();
        let error = casts.cast(fields([("id", "abc")])).unwrap_err();

        match error {
            HydrationError::TypeConversion { table, column, .. } => {
                assert_eq!(table, "Articles");
                assert_eq!(column, "id");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_custom_converter_registration() {
        #[derive(Debug)]
        struct UpperType;

        impl TypeConverter for UpperType {
            fn name(&self) -> &str {
                "upper"
            }

            fn to_application_value(&self, raw: Value) -> std::result::Result<Value, String> {
                Ok(match raw {
                    Value::Text(s) => Value::Text(s.to_uppercase()),
                    other => other,
                })
            }
        }

        let mut registry = TypeRegistry::empty();
        registry.register("upper", UpperType);
        let schema = TableSchema::new("Tags").column("name", "upper");
        let casts = registry.cast_map(&schema).unwrap();

        assert_eq!(casts.cast(fields([("name", "rust")])).unwrap()["name"], Value::from("RUST"));
    }
}
