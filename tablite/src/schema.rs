///
/// Schema derivation.
///
/// Turns a record type's static column metadata into a validated,
/// ordered column list. Pure function of the type: two calls yield
/// identical lists in identical order. The first column becomes the
/// primary index and is validated here, so that an illegal record shape
/// is rejected before any SQL is generated.
///

use crate::column::Columns;
use crate::errors::SchemaError;
use crate::record::Record;

pub fn table_columns<T: Record>() -> Result<Columns, SchemaError> {
    let mut columns = T::columns();
    if columns.is_empty() {
        return Err(SchemaError::MissingColumns {
            table: T::TABLE.to_string(),
        }
        .logged());
    }

    columns[0].primary = true;

    let primary = &columns[0];
    if primary.optional {
        return Err(SchemaError::OptionalPrimary {
            column: primary.name.clone(),
        }
        .logged());
    }
    if !primary.kind.is_primary_capable() {
        return Err(SchemaError::UnsupportedPrimary {
            column: primary.name.clone(),
            kind: primary.kind,
        }
        .logged());
    }

    Ok(columns)
}
