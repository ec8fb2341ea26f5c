use std::{borrow::Cow, fs};

use approx::assert_relative_eq;
use ndarray::array;
use tempfile::tempdir;

use ndarray_tables::io::{
    dim_double_array_2d, read_double_array_2d, write_double_array_2d, CsvOptions, MatVersion,
    ProvidedTable, TableKind, TableProvider,
};
use ndarray_tables::{
    BuilderError, FileError, Interp1DBuilder, Interp2DBuilder, TableSource, TimeTableBuilder,
    NO_EVENT,
};

const TEXT: &str = "#1
double tab1(5, 3)   # time, y1, y2
  0   0   1
  1   2   0.5
  2   3   1
  3   5   2
  4   7   4.5

double tab2(3,3)
  0  1  2
  1  1  2
  2  2  4
";

#[test]
fn text_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tables.txt");
    fs::write(&path, TEXT).unwrap();
    let file = path.to_str().unwrap();

    let interp = Interp1DBuilder::from_file("tab1", file)
        .columns(&[2])
        .build()
        .unwrap();
    assert_eq!(interp.source(), TableSource::File);
    assert_eq!(interp.table_name(), "tab1");
    assert_eq!(interp.file_name(), file);
    assert_eq!(interp.value(1, 1.5).unwrap(), 2.5);

    let interp = Interp2DBuilder::from_file("tab2", file).build().unwrap();
    assert_relative_eq!(interp.value(1.5, 1.5).unwrap(), 2.25);
}

#[test]
fn text_file_without_format_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no_header.txt");
    fs::write(&path, "double tab1(1,2)\n0 1\n").unwrap();
    let file = path.to_str().unwrap();

    let err = Interp1DBuilder::from_file("tab1", file).build().unwrap_err();
    assert!(matches!(
        err,
        BuilderError::File(FileError::MissingHeader { .. })
    ));
    assert!(err.to_string().contains(file));
}

#[test]
fn missing_file_and_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tables.txt");
    fs::write(&path, TEXT).unwrap();

    let err = Interp1DBuilder::from_file("tab3", path.to_str().unwrap())
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        BuilderError::File(FileError::TableNotFound { .. })
    ));

    let missing = dir.path().join("missing.txt");
    let err = TimeTableBuilder::from_file("tab1", missing.to_str().unwrap())
        .build()
        .unwrap_err();
    assert!(matches!(err, BuilderError::File(FileError::Open { .. })));
}

#[test]
fn csv_equals_text() {
    let dir = tempdir().unwrap();
    let text = dir.path().join("tables.txt");
    fs::write(&text, TEXT).unwrap();
    let csv = dir.path().join("tab1.csv");
    fs::write(&csv, "time;y1;y2\n0;0;1\n1;2;0.5\n2;3;1\n3;5;2\n4;7;4.5\n").unwrap();

    let from_text = Interp1DBuilder::from_file("tab1", text.to_str().unwrap())
        .build()
        .unwrap();
    let from_csv = Interp1DBuilder::from_file("tab1", csv.to_str().unwrap())
        .csv_options(CsvOptions {
            delimiter: ';',
            header_lines: 1,
        })
        .build()
        .unwrap();
    assert_eq!(from_text.table().view(), from_csv.table().view());
    for u in [0.25, 1.5, 3.75] {
        assert_eq!(from_text.interp(u).unwrap(), from_csv.interp(u).unwrap());
    }
}

#[test]
fn mat_files() {
    let dir = tempdir().unwrap();
    let tab1 = array![[0.0, 0.0], [1.0, 1.0], [1.0, 2.0], [2.0, 2.0]];
    let tab2 = array![[0.0, 1.0, 2.0], [1.0, 1.0, 2.0], [2.0, 2.0, 4.0]];
    for (version, name) in [
        (MatVersion::V4, "v4.mat"),
        (MatVersion::V6, "v6.mat"),
        (MatVersion::V7, "v7.mat"),
    ] {
        let path = dir.path().join(name);
        let file = path.to_str().unwrap();
        write_double_array_2d(file, "tab1", &tab1, false, version).unwrap();
        write_double_array_2d(file, "tab2", &tab2, true, version).unwrap();

        assert_eq!(dim_double_array_2d(file, "tab1").unwrap(), (4, 2));
        assert_eq!(read_double_array_2d(file, "tab2", 3, 3).unwrap(), tab2);

        let mut table = TimeTableBuilder::from_file("tab1", file).build().unwrap();
        let event = table.next_time_event(0.0);
        assert_eq!(event, 1.0);
        assert_eq!(table.value(1, 0.5, event, event).unwrap(), 0.5);
        assert_eq!(table.value(1, 1.5, NO_EVENT, NO_EVENT).unwrap(), 2.0);

        let interp = Interp2DBuilder::from_file("tab2", file).build().unwrap();
        assert_eq!(interp.value(2.0, 2.0).unwrap(), 4.0);
    }
}

#[test]
fn read_again() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("table.mat");
    let file = path.to_str().unwrap();
    write_double_array_2d(file, "tab", &array![[0.0, 1.0], [1.0, 2.0]], false, MatVersion::V6)
        .unwrap();

    let mut interp = Interp1DBuilder::from_file("tab", file).build().unwrap();
    assert_eq!(interp.value(1, 0.5).unwrap(), 1.5);

    write_double_array_2d(file, "tab", &array![[0.0, 3.0], [1.0, 5.0]], true, MatVersion::V6)
        .unwrap();
    interp.read(false).unwrap();
    assert_eq!(interp.value(1, 0.5).unwrap(), 1.5);
    interp.read(true).unwrap();
    assert_eq!(interp.value(1, 0.5).unwrap(), 4.0);

    // a broken file keeps the previous table
    fs::write(&path, b"not a mat-file").unwrap();
    assert!(interp.read(true).is_err());
    assert_eq!(interp.value(1, 0.5).unwrap(), 4.0);
}

/// Tables of a simulation environment, the 2D table stored by column
struct Environment {
    time: Vec<f64>,
    grid: Vec<f64>,
}

impl TableProvider for Environment {
    fn provide(
        &self,
        table_name: &str,
        kind: TableKind,
    ) -> Result<ProvidedTable<'_>, Box<dyn std::error::Error + Send + Sync>> {
        match (table_name, kind) {
            ("time", TableKind::Time) => Ok(ProvidedTable {
                rows: 3,
                cols: 2,
                column_major: false,
                data: Cow::Borrowed(&self.time),
            }),
            ("grid", TableKind::TwoDim) => Ok(ProvidedTable {
                rows: 3,
                cols: 3,
                column_major: true,
                data: Cow::Borrowed(&self.grid),
            }),
            _ => Err(format!("no {kind:?} table \"{table_name}\"").into()),
        }
    }
}

#[test]
fn provider_tables() {
    let env = Environment {
        time: vec![0.0, 0.0, 1.0, 1.0, 2.0, 4.0],
        // rows [0, 1, 2], [1, 1, 3], [2, 2, 6]
        grid: vec![0.0, 1.0, 2.0, 1.0, 1.0, 2.0, 2.0, 3.0, 6.0],
    };

    let table = TimeTableBuilder::from_provider("time", &env).build().unwrap();
    assert_eq!(table.source(), TableSource::Provider);
    assert!(!table.table().is_owned());
    assert_eq!(table.value(1, 1.5, NO_EVENT, NO_EVENT).unwrap(), 2.5);

    let interp = Interp2DBuilder::from_provider("grid", &env).build().unwrap();
    assert_eq!(interp.source(), TableSource::ProviderTransposed);
    assert!(interp.table().is_owned());
    assert_eq!(interp.value(2.0, 1.0).unwrap(), 2.0);
    assert_eq!(interp.value(1.0, 2.0).unwrap(), 3.0);

    let err = Interp1DBuilder::from_provider("grid", &env).build().unwrap_err();
    assert!(matches!(err, BuilderError::Provider(_)));
    assert_eq!(err.to_string(), "no OneDim table \"grid\"");
}
