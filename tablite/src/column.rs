///
/// Column descriptors and the field-type to column-kind mapping.
///
/// A `Column` describes one table column: name, width-preserving kind,
/// optionality, and whether it is the primary index. Column order equals
/// field declaration order and the first column is the primary index by
/// convention.
///
/// `Column::command()` renders the column definition used by CREATE
/// TABLE. Each kind maps to exactly one SQL affinity; narrow integers,
/// bool, and floats are legal columns but rejected as primary indexes.
///

use std::fmt;

use crate::errors::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Real32,
    Real64,
    Text,
}

impl ColumnKind {
    /// The SQL affinity this kind maps to.
    pub fn affinity(self) -> &'static str {
        match self {
            ColumnKind::Bool
            | ColumnKind::Int8
            | ColumnKind::Int16
            | ColumnKind::Int32
            | ColumnKind::Int64
            | ColumnKind::UInt8
            | ColumnKind::UInt16
            | ColumnKind::UInt32
            | ColumnKind::UInt64 => "INTEGER",
            ColumnKind::Real32 | ColumnKind::Real64 => "DOUBLE",
            ColumnKind::Text => "TEXT",
        }
    }

    /// Wide integers are the only kinds that can autoincrement.
    pub fn is_wide_integer(self) -> bool {
        matches!(
            self,
            ColumnKind::Int32 | ColumnKind::Int64 | ColumnKind::UInt32 | ColumnKind::UInt64
        )
    }

    /// Legal as the primary index: wide integers and text.
    pub fn is_primary_capable(self) -> bool {
        self.is_wide_integer() || self == ColumnKind::Text
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Bool => "bool",
            ColumnKind::Int8 => "i8",
            ColumnKind::Int16 => "i16",
            ColumnKind::Int32 => "i32",
            ColumnKind::Int64 => "i64",
            ColumnKind::UInt8 => "u8",
            ColumnKind::UInt16 => "u16",
            ColumnKind::UInt32 => "u32",
            ColumnKind::UInt64 => "u64",
            ColumnKind::Real32 => "f32",
            ColumnKind::Real64 => "f64",
            ColumnKind::Text => "String",
        };
        write!(f, "{}", name)
    }
}

/// Static mapping from a record field type to its column kind. An
/// unsupported field type fails to compile rather than at run time.
pub trait ColumnType {
    const KIND: ColumnKind;
    const OPTIONAL: bool = false;
}

impl ColumnType for bool {
    const KIND: ColumnKind = ColumnKind::Bool;
}

impl ColumnType for i8 {
    const KIND: ColumnKind = ColumnKind::Int8;
}

impl ColumnType for i16 {
    const KIND: ColumnKind = ColumnKind::Int16;
}

impl ColumnType for i32 {
    const KIND: ColumnKind = ColumnKind::Int32;
}

impl ColumnType for i64 {
    const KIND: ColumnKind = ColumnKind::Int64;
}

impl ColumnType for u8 {
    const KIND: ColumnKind = ColumnKind::UInt8;
}

impl ColumnType for u16 {
    const KIND: ColumnKind = ColumnKind::UInt16;
}

impl ColumnType for u32 {
    const KIND: ColumnKind = ColumnKind::UInt32;
}

impl ColumnType for u64 {
    const KIND: ColumnKind = ColumnKind::UInt64;
}

impl ColumnType for f32 {
    const KIND: ColumnKind = ColumnKind::Real32;
}

impl ColumnType for f64 {
    const KIND: ColumnKind = ColumnKind::Real64;
}

impl ColumnType for String {
    const KIND: ColumnKind = ColumnKind::Text;
}

impl<T: ColumnType> ColumnType for Option<T> {
    const KIND: ColumnKind = T::KIND;
    const OPTIONAL: bool = true;
}

pub type Columns = Vec<Column>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub optional: bool,
    pub primary: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, optional: bool) -> Self {
        Column {
            name: name.into(),
            kind,
            optional,
            primary: false,
        }
    }

    /// Descriptor for a field of type `T`, kind and optionality taken
    /// from the static mapping.
    pub fn of<T: ColumnType>(name: impl Into<String>) -> Self {
        Column::new(name, T::KIND, T::OPTIONAL)
    }

    /// Renders the column definition for CREATE TABLE.
    pub fn command(&self) -> Result<String, SchemaError> {
        if self.primary && self.optional {
            return Err(SchemaError::OptionalPrimary {
                column: self.name.clone(),
            }
            .logged());
        }
        if self.primary && !self.kind.is_primary_capable() {
            return Err(SchemaError::UnsupportedPrimary {
                column: self.name.clone(),
                kind: self.kind,
            }
            .logged());
        }

        let mut command = vec![self.name.clone(), self.kind.affinity().to_string()];
        if self.primary {
            if self.kind.is_wide_integer() {
                command.push("PRIMARY KEY AUTOINCREMENT".to_string());
            } else {
                command.push("PRIMARY KEY".to_string());
            }
        }
        if !self.optional {
            command.push("NOT NULL".to_string());
        }

        Ok(command.join(" "))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}{}",
            self.name,
            self.kind,
            if self.optional { "?" } else { "" }
        )
    }
}
