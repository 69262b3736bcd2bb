//! Common GraphQL types

use async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, SimpleObject, Value};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime as ChronoDateTime, Utc};
use isocountry::CountryCode;

use crate::store::Record;
use crate::DirectoryError;

/// DateTime scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime(pub ChronoDateTime<Utc>);

#[Scalar]
impl ScalarType for DateTime {
    fn parse(value: Value) -> InputValueResult<Self> {
        if let Value::String(s) = value {
            Ok(DateTime(
                ChronoDateTime::parse_from_rfc3339(&s)
                    .map_err(|e| format!("Invalid DateTime: {}", e))?
                    .with_timezone(&Utc),
            ))
        } else {
            Err("Expected string for DateTime".into())
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.0.to_rfc3339())
    }
}

impl From<ChronoDateTime<Utc>> for DateTime {
    fn from(value: ChronoDateTime<Utc>) -> Self {
        DateTime(value)
    }
}

/// Opaque global id: base64 of `TypeName:pk`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalId {
    pub type_name: String,
    pub pk: i64,
}

impl GlobalId {
    pub fn new(type_name: impl Into<String>, pk: i64) -> Self {
        Self { type_name: type_name.into(), pk }
    }

    /// Global id of a stored row
    pub fn of<T: Record>(pk: i64) -> Self {
        Self::new(T::TYPE_NAME, pk)
    }

    pub fn encode(&self) -> String {
        BASE64.encode(format!("{}:{}", self.type_name, self.pk))
    }

    pub fn decode(raw: &str) -> crate::Result<Self> {
        let invalid = || DirectoryError::InvalidId(raw.to_string());
        let bytes = BASE64.decode(raw.as_bytes()).map_err(|_| invalid())?;
        let text = String::from_utf8(bytes).map_err(|_| invalid())?;
        let (type_name, pk) = text.split_once(':').ok_or_else(invalid)?;
        if type_name.is_empty() {
            return Err(invalid());
        }
        let pk = pk.parse::<i64>().map_err(|_| invalid())?;
        Ok(Self::new(type_name, pk))
    }

    /// Primary key, provided the id names rows of type `T`
    pub fn pk_of<T: Record>(&self) -> crate::Result<i64> {
        if self.type_name == T::TYPE_NAME {
            Ok(self.pk)
        } else {
            Err(DirectoryError::WrongIdType { expected: T::TYPE_NAME, found: self.type_name.clone() })
        }
    }
}

#[Scalar(name = "GlobalID")]
impl ScalarType for GlobalId {
    fn parse(value: Value) -> InputValueResult<Self> {
        match value {
            Value::String(s) => GlobalId::decode(&s).map_err(|e| InputValueError::custom(e.to_string())),
            other => Err(InputValueError::expected_type(other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.encode())
    }
}

/// Untyped JSON array, as accepted for free-form string sequences
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonArray(pub Vec<serde_json::Value>);

#[Scalar(name = "Array")]
impl ScalarType for JsonArray {
    fn parse(value: Value) -> InputValueResult<Self> {
        match value.into_json() {
            Ok(serde_json::Value::Array(items)) => Ok(JsonArray(items)),
            Ok(_) => Err("Expected an array".into()),
            Err(e) => Err(InputValueError::custom(e.to_string())),
        }
    }

    fn to_value(&self) -> Value {
        Value::from_json(serde_json::Value::Array(self.0.clone())).unwrap_or(Value::Null)
    }
}

impl JsonArray {
    /// The items as strings, or the index of the first non-string item
    pub fn strings(&self) -> Result<Vec<String>, usize> {
        self.0
            .iter()
            .enumerate()
            .map(|(idx, item)| match item {
                serde_json::Value::String(s) => Ok(s.clone()),
                _ => Err(idx),
            })
            .collect()
    }
}

impl From<&[String]> for JsonArray {
    fn from(items: &[String]) -> Self {
        JsonArray(items.iter().cloned().map(serde_json::Value::String).collect())
    }
}

/// Country code with its display name
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct CountryDisplay {
    pub code: String,
    pub country_name: String,
}

impl CountryDisplay {
    pub fn from_code(code: &str) -> Self {
        let code = code.to_ascii_uppercase();
        let country_name = country_name(&code).unwrap_or(code.as_str()).to_string();
        Self { code, country_name }
    }
}

/// Image rendition picked for a requested size
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
#[graphql(name = "ImageRendition")]
pub struct ImageRendition {
    pub url: String,
    pub alt: String,
    pub size: i32,
}

/// Downloadable brochure file
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
#[graphql(name = "BrochureFile")]
pub struct BrochureFile {
    pub url: String,
    pub name: Option<String>,
}

/// ISO 3166-1 alpha-2 name of a country code, any case
pub fn country_name(code: &str) -> Option<&'static str> {
    CountryCode::for_alpha2(&code.to_ascii_uppercase()).ok().map(|country| country.name())
}
