//! Declarative shape checks for API responses.
//!
//! A [`Shape`] only looks at field presence and primitive JSON types. It
//! never checks values (an offset of 250% is still a number), and it ignores
//! fields it doesn't know about, since the upstream adds fields freely.
//!
//! Optional fields may be absent or `null`: the API sends `"webImage": null`
//! for objects without an image.

use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde_json::Value;
#[derive(Debug, Clone)]
pub enum Shape {
    String,
    Number,
    Integer,
    Boolean,
    Array(Box<Shape>),
    Object(Vec<Field>),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
}

pub fn required(name: &'static str, shape: Shape) -> Field {
    Field {
        name,
        shape,
        required: true,
    }
}

pub fn optional(name: &'static str, shape: Shape) -> Field {
    Field {
        name,
        shape,
        required: false,
    }
}

impl Shape {
    pub fn array_of(shape: Shape) -> Self {
        Shape::Array(Box::new(shape))
    }

    fn expected(&self) -> &'static str {
        match self {
            Shape::String => "string",
            Shape::Number => "number",
            Shape::Integer => "integer",
            Shape::Boolean => "boolean",
            Shape::Array(_) => "array",
            Shape::Object(_) => "object",
        }
    }

    fn check(&self, value: &Value, path: &str, failures: &mut Vec<FieldFailure>) {
        let matches = match (self, value) {
            (Shape::String, Value::String(_)) => true,
            (Shape::Number, Value::Number(_)) => true,
            (Shape::Integer, Value::Number(number)) => number.is_i64() || number.is_u64(),
            (Shape::Boolean, Value::Bool(_)) => true,
            (Shape::Array(item_shape), Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    item_shape.check(item, &format!("{path}[{i}]"), failures);
                }
                true
            }
            (Shape::Object(fields), Value::Object(map)) => {
                for field in fields {
                    let field_path = if path.is_empty() {
                        field.name.to_owned()
                    } else {
                        format!("{path}.{}", field.name)
                    };
                    match map.get(field.name) {
                        None | Some(Value::Null) if field.required => {
                            failures.push(FieldFailure {
                                path: field_path,
                                expected: field.shape.expected(),
                                found: "missing",
                            });
                        }
                        None | Some(Value::Null) => {}
                        Some(field_value) => field.shape.check(field_value, &field_path, failures),
                    }
                }
                true
            }
            _ => false,
        };
        if !matches {
            failures.push(FieldFailure {
                path: if path.is_empty() {
                    "(root)".to_owned()
                } else {
                    path.to_owned()
                },
                expected: self.expected(),
                found: json_type_name(value),
            });
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub path: String,
    pub expected: &'static str,
    pub found: &'static str,
}

impl Display for FieldFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.path, self.expected, self.found
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub schema: &'static str,
    pub failures: Vec<FieldFailure>,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "response does not match {} schema ({} failure{})",
            self.schema,
            self.failures.len(),
            if self.failures.len() == 1 { "" } else { "s" }
        )?;
        for failure in &self.failures {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// A named top-level shape.
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: &'static str,
    pub shape: Shape,
}

impl Schema {
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let mut failures = vec![];
        self.shape.check(value, "", &mut failures);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                schema: self.name,
                failures,
            })
        }
    }

    /// Validates `value`, then decodes it into `T`.
    pub fn validate_as<T: DeserializeOwned>(&self, value: Value) -> Result<T, ValidationError> {
        self.validate(&value)?;
        serde_json::from_value(value).map_err(|err| ValidationError {
            schema: self.name,
            failures: vec![FieldFailure {
                path: format!("(decode: {err})"),
                expected: "decodable value",
                found: "mismatch",
            }],
        })
    }
}

fn links() -> Shape {
    Shape::Object(vec![
        required("self", Shape::String),
        required("web", Shape::String),
    ])
}

pub fn image_descriptor() -> Shape {
    Shape::Object(vec![
        required("guid", Shape::String),
        required("offsetPercentageX", Shape::Number),
        required("offsetPercentageY", Shape::Number),
        required("width", Shape::Integer),
        required("height", Shape::Integer),
        required("url", Shape::String),
    ])
}

/// A list entry. Only the fields every list response has carried are
/// required; everything else depends on the query.
pub fn art_object() -> Shape {
    Shape::Object(vec![
        optional("links", links()),
        optional("id", Shape::String),
        required("objectNumber", Shape::String),
        required("title", Shape::String),
        required("hasImage", Shape::Boolean),
        required("principalOrFirstMaker", Shape::String),
        optional("longTitle", Shape::String),
        optional("showImage", Shape::Boolean),
        optional("permitDownload", Shape::Boolean),
        optional("webImage", image_descriptor()),
        optional("headerImage", image_descriptor()),
        optional("productionPlaces", Shape::array_of(Shape::String)),
    ])
}

pub fn collection_list() -> Schema {
    Schema {
        name: "collection list",
        shape: Shape::Object(vec![
            required("artObjects", Shape::array_of(art_object())),
            optional("count", Shape::Integer),
        ]),
    }
}

pub fn art_object_detail() -> Schema {
    Schema {
        name: "art object detail",
        shape: Shape::Object(vec![required(
            "artObject",
            Shape::Object(vec![
                required("id", Shape::String),
                required("title", Shape::String),
                required("objectNumber", Shape::String),
                required("principalOrFirstMaker", Shape::String),
                optional("description", Shape::String),
                optional("productionPlaces", Shape::array_of(Shape::String)),
                optional("hasImage", Shape::Boolean),
                optional("webImage", image_descriptor()),
                optional("headerImage", image_descriptor()),
            ]),
        )]),
    }
}

pub fn error_response() -> Schema {
    Schema {
        name: "error response",
        shape: Shape::Object(vec![
            required("status", Shape::Integer),
            required("error", Shape::String),
            optional("message", Shape::String),
        ]),
    }
}
