// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Restricted JSON-Schema view used for structural validation.
//!
//! Only `type`, `properties`, `required`, `items` and `additionalProperties` are
//! interpreted. Other keys (including `x-*` extensions) are ignored.

use hashlink::LinkedHashMap;

use crate::{error::MappingError, value::Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchemaDefinition {
    /// Empty means any type.
    pub types: Vec<SchemaType>,
    pub properties: LinkedHashMap<String, SchemaDefinition>,
    pub required: Vec<String>,
    pub items: Option<Box<SchemaDefinition>>,
    /// `None` when the schema does not say.
    pub additional_properties: Option<bool>,
}

impl SchemaType {
    fn from_name(name: &str) -> Result<SchemaType, MappingError> {
        match name {
            "object" => Ok(SchemaType::Object),
            "array" => Ok(SchemaType::Array),
            "string" => Ok(SchemaType::String),
            "number" => Ok(SchemaType::Number),
            "integer" => Ok(SchemaType::Integer),
            "boolean" => Ok(SchemaType::Boolean),
            "null" => Ok(SchemaType::Null),
            other => Err(MappingError::InvalidFormat(format!("unknown schema type '{}'", other))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Null => "null",
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (SchemaType::Object, Value::Map(_))
            | (SchemaType::Array, Value::Array(_))
            | (SchemaType::String, Value::String(_))
            | (SchemaType::Integer, Value::Integer(_))
            | (SchemaType::Number, Value::Integer(_) | Value::Real(_))
            | (SchemaType::Boolean, Value::Boolean(_))
            | (SchemaType::Null, Value::Null) => true,
            (SchemaType::Integer, Value::Real(real)) => real.fract() == 0.0,
            _ => false,
        }
    }
}

impl SchemaDefinition {
    pub fn from_json_str(input: &str) -> Result<SchemaDefinition, MappingError> {
        let value = crate::value::parse_json_str(input)?;
        SchemaDefinition::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<SchemaDefinition, MappingError> {
        let Value::Map(map) = value else {
            return Err(MappingError::InvalidFormat(format!(
                "schema must be a map, found {}",
                value.type_name()
            )));
        };

        let mut schema = SchemaDefinition::default();

        match map.get("type") {
            None => {}
            Some(Value::String(name)) => schema.types.push(SchemaType::from_name(name)?),
            Some(Value::Array(names)) => {
                for name in names {
                    let Value::String(name) = name else {
                        return Err(MappingError::InvalidFormat("schema 'type' entries must be strings".to_string()));
                    };
                    schema.types.push(SchemaType::from_name(name)?);
                }
            }
            Some(other) => {
                return Err(MappingError::InvalidFormat(format!(
                    "schema 'type' must be a string or list, found {}",
                    other.type_name()
                )))
            }
        }

        match map.get("properties") {
            None => {}
            Some(Value::Map(properties)) => {
                for (name, property) in properties {
                    let property = SchemaDefinition::from_value(property)
                        .map_err(|err| Self::nested_error(err, &format!("properties.{}", name)))?;
                    schema.properties.insert(name.clone(), property);
                }
            }
            Some(other) => {
                return Err(MappingError::InvalidFormat(format!(
                    "schema 'properties' must be a map, found {}",
                    other.type_name()
                )))
            }
        }

        match map.get("required") {
            None => {}
            Some(Value::Array(names)) => {
                for name in names {
                    let Value::String(name) = name else {
                        return Err(MappingError::InvalidFormat("schema 'required' entries must be strings".to_string()));
                    };
                    schema.required.push(name.clone());
                }
            }
            Some(other) => {
                return Err(MappingError::InvalidFormat(format!(
                    "schema 'required' must be a list, found {}",
                    other.type_name()
                )))
            }
        }

        if let Some(items) = map.get("items") {
            let items = SchemaDefinition::from_value(items).map_err(|err| Self::nested_error(err, "items"))?;
            schema.items = Some(Box::new(items));
        }

        match map.get("additionalProperties") {
            None => {}
            Some(Value::Boolean(allowed)) => schema.additional_properties = Some(*allowed),
            // A schema object means "allowed, with constraints" which is not interpreted here.
            Some(Value::Map(_)) => schema.additional_properties = Some(true),
            Some(other) => {
                return Err(MappingError::InvalidFormat(format!(
                    "schema 'additionalProperties' must be a bool, found {}",
                    other.type_name()
                )))
            }
        }

        Ok(schema)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|required| required == name)
    }

    pub fn allows(&self, value: &Value) -> bool {
        self.types.is_empty() || self.types.iter().any(|ty| ty.matches(value))
    }

    pub fn type_names(&self) -> String {
        self.types.iter().map(SchemaType::name).collect::<Vec<_>>().join("|")
    }

    fn nested_error(err: MappingError, location: &str) -> MappingError {
        match err {
            MappingError::InvalidFormat(message) => MappingError::InvalidFormat(format!("{}: {}", location, message)),
            other => other,
        }
    }
}
