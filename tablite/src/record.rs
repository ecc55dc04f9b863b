///
/// The per-record traversal contract.
///
/// A record is a typed aggregate mapped one-to-one to a table row. Its
/// first field is the row identifier (0 means not yet assigned), followed
/// by zero or more data fields. The `Record` trait exposes the three
/// walks the gateway needs — column derivation, encoding to bindings,
/// decoding from a row — as static per-type metadata generated once at
/// build time, plus access to the row identifier.
///
/// The `record!` macro expands a struct declaration with per-field
/// column names into the struct and its `Record` implementation. The
/// first declared field is the row identifier and must be of type
/// `RowId`. The macro derives Debug, Clone, and PartialEq.
///

use crate::binding::Bindings;
use crate::column::Columns;
use crate::errors::DecodeError;
use crate::row::Row;

/// 64-bit signed row identifier. 0 is reserved as invalid/unassigned.
pub type RowId = i64;

pub const INVALID_ROW_ID: RowId = 0;

pub trait Record: Clone + 'static {
    const TABLE: &'static str;

    /// Column descriptors in field declaration order, row id first.
    fn columns() -> Columns;

    /// One binding per field in declaration order, null for absent
    /// optional fields. Cannot fail: the primitive set is closed.
    fn to_bindings(&self) -> Bindings;

    /// Rebuilds a record from a result row, resolving each field by
    /// column name.
    fn from_row(row: &Row<'_>) -> Result<Self, DecodeError>;

    fn row_id(&self) -> RowId;

    fn set_row_id(&mut self, row_id: RowId);
}

#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident ($table:literal) {
            $id_field:ident: $id_ty:ty as $id_col:literal,
            $($field:ident: $fty:ty as $col:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name {
            pub $id_field: $id_ty,
            $(pub $field: $fty,)*
        }

        impl $crate::Record for $name {
            const TABLE: &'static str = $table;

            fn columns() -> $crate::Columns {
                vec![
                    $crate::Column::of::<$id_ty>($id_col),
                    $($crate::Column::of::<$fty>($col),)*
                ]
            }

            fn to_bindings(&self) -> $crate::Bindings {
                vec![
                    $crate::Binding::new($id_col, &self.$id_field),
                    $($crate::Binding::new($col, &self.$field),)*
                ]
            }

            fn from_row(
                row: &$crate::Row<'_>,
            ) -> ::std::result::Result<Self, $crate::DecodeError> {
                Ok(Self {
                    $id_field: row.get($id_col)?,
                    $($field: row.get($col)?,)*
                })
            }

            fn row_id(&self) -> $crate::RowId {
                self.$id_field
            }

            fn set_row_id(&mut self, row_id: $crate::RowId) {
                self.$id_field = row_id;
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::column::ColumnKind;
    use crate::record::{INVALID_ROW_ID, Record, RowId};
    use crate::value::Value;

    record! {
        struct Speedtest("speedtest") {
            row_id: RowId as "_id",
            timestamp: i64 as "Q0",
            download: f64 as "T1",
            upload: f64 as "T2",
            status: String as "S",
            note: Option<String> as "N",
        }
    }

    fn sample() -> Speedtest {
        Speedtest {
            row_id: INVALID_ROW_ID,
            timestamp: 1_700_000_000,
            download: 287.5,
            upload: 112.25,
            status: "Success".to_string(),
            note: None,
        }
    }

    #[test]
    fn test_columns_follow_declaration_order() {
        let columns = Speedtest::columns();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["_id", "Q0", "T1", "T2", "S", "N"]);
        assert_eq!(columns[0].kind, ColumnKind::Int64);
        assert_eq!(columns[2].kind, ColumnKind::Real64);
        assert!(columns[5].optional, "Option fields must be optional columns");
        assert!(
            columns.iter().all(|c| !c.primary),
            "primary is assigned by schema derivation, not by the record"
        );
    }

    #[test]
    fn test_bindings_follow_declaration_order() {
        let bindings = sample().to_bindings();
        let columns: Vec<&str> = bindings.iter().map(|b| b.column.as_str()).collect();
        assert_eq!(columns, ["_id", "Q0", "T1", "T2", "S", "N"]);
        assert_eq!(bindings[0].value, Value::Signed(0));
        assert_eq!(bindings[1].value, Value::Signed(1_700_000_000));
        assert_eq!(bindings[3].value, Value::Real(112.25));
        assert_eq!(bindings[4].value, Value::Text("Success".to_string()));
        assert_eq!(bindings[5].value, Value::Null, "absent fields encode as null");
    }

    #[test]
    fn test_row_id_accessors_use_the_first_field() {
        let mut record = sample();
        assert_eq!(record.row_id(), INVALID_ROW_ID);
        record.set_row_id(17);
        assert_eq!(record.row_id(), 17);
        assert_eq!(record.row_id, 17);
    }
}
