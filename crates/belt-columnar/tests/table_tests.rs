use belt_columnar::{
    Column, ColumnType, Dictionary, NominalColumnBuilder, Table, Value, BEFORE_FIRST_ROW,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn build_table() -> Table {
    let mut names = NominalColumnBuilder::new();
    for value in [Some("A"), Some("B"), None, Some("A"), Some("C")] {
        names.push(value);
    }
    Table::builder(5)
        .add("s", names.finish())
        .add("n", Column::real(vec![1.0, 2.0, 3.0, f64::NAN, 2.0]))
        .add(
            "t",
            Column::date_time(vec![Some(0), None, Some(60), Some(120), Some(180)]),
        )
        .build()
        .unwrap()
}

#[test]
fn columns_keep_their_types() {
    let table = build_table();
    assert_eq!(table.height(), 5);
    assert_eq!(table.column("s").unwrap().column_type(), ColumnType::Nominal);
    assert_eq!(table.column("n").unwrap().column_type(), ColumnType::Real);
    assert_eq!(table.column("t").unwrap().column_type(), ColumnType::DateTime);
}

#[test]
fn reader_scans_mixed_columns() {
    let table = build_table();
    let mut reader = table.reader(&["s", "n", "t"]).unwrap();
    assert_eq!(reader.width(), 3);

    let mut indices = Vec::new();
    let mut times = Vec::new();
    while reader.has_remaining() {
        reader.advance();
        indices.push(reader.get(0));
        times.push(reader.get_value(2));
    }
    assert_eq!(indices, vec![1.0, 2.0, 0.0, 1.0, 3.0]);
    assert_eq!(
        times,
        vec![
            Value::DateTime(0),
            Value::Missing,
            Value::DateTime(60),
            Value::DateTime(120),
            Value::DateTime(180),
        ]
    );

    reader.set_position(BEFORE_FIRST_ROW);
    reader.advance();
    assert_eq!(reader.position(), 0);
}

#[test]
fn shared_dictionary_columns() {
    let dict = Arc::new(Dictionary::new(["no", "yes"]).unwrap());
    let left = Column::categorical(vec![1, 2, 0], dict.clone()).unwrap();
    let right = Column::categorical(vec![2, 2], dict).unwrap();
    assert!(Arc::ptr_eq(
        left.dictionary().unwrap(),
        right.dictionary().unwrap()
    ));

    let boolean = left.to_boolean(Some("yes")).unwrap();
    let dict = boolean.dictionary().unwrap();
    assert!(dict.is_boolean());
    assert_eq!(dict.positive_index(), Some(2));
    assert_eq!(dict.negative_index(), Some(1));
    assert_eq!(boolean.to_values(), left.to_values());
}

#[test]
fn boolean_conversion_rejects_numeric_columns() {
    let column = Column::real(vec![1.0]);
    assert!(column.to_boolean(None).is_err());
}
