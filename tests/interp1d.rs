// The linear strategy is used to test most of the behaviour of `Interp1D`,
// the Akima spline has its own tests in `akima.rs`

use approx::{assert_abs_diff_eq, assert_relative_eq};
use ndarray::{array, Array1, Array2};

use ndarray_tables::interp1d::{Interp1D, Interp1DBuilder};
use ndarray_tables::{BuilderError, Extrapolation, InterpolateError, Smoothness, TableSource};

fn table() -> Array2<f64> {
    array![
        [0.0, 0.0, 1.0],
        [1.0, 2.0, 0.5],
        [2.0, 3.0, 1.0],
        [3.0, 5.0, 2.0],
        [4.0, 7.0, 4.5],
    ]
}

#[test]
fn interp_selected_column() {
    let data = table();
    let interp = Interp1DBuilder::new(data.view())
        .columns(&[2])
        .build()
        .unwrap();
    assert_eq!(interp.value(1, 1.5).unwrap(), 2.5);
    assert_eq!(interp.value(1, 0.0).unwrap(), 0.0);
    assert_eq!(interp.value(1, 4.0).unwrap(), 7.0);
    assert_eq!(interp.value(1, 3.25).unwrap(), 5.5);
    assert_eq!(interp.derivative(1, 1.5, 2.0).unwrap(), 2.0);
    assert!(matches!(
        interp.value(2, 1.5),
        Err(InterpolateError::UnknownColumn { column: 2, count: 1 })
    ));
}

#[test]
fn interp_all_columns() {
    let data = table();
    let interp = Interp1D::builder(data.view()).build().unwrap();
    assert_eq!(interp.columns(), &[2, 3]);
    assert_eq!(interp.interp(2.5).unwrap(), array![4.0, 1.5]);
    assert_eq!(interp.value(2, 0.5).unwrap(), 0.75);

    let mut buffer = Array1::zeros(2);
    interp.interp_into(3.5, buffer.view_mut()).unwrap();
    assert_eq!(buffer, array![6.0, 3.25]);
}

#[test]
fn interp_array() {
    let data = table();
    let interp = Interp1D::builder(data.view()).build().unwrap();
    let res = interp.interp_array(&array![0.5, 3.5, 1.0]).unwrap();
    assert_eq!(res, array![[1.0, 0.75], [6.0, 3.25], [2.0, 0.5]]);
}

#[test]
#[should_panic(expected = "buffer length")]
fn interp_into_wrong_buffer() {
    let data = table();
    let interp = Interp1D::builder(data.view()).build().unwrap();
    let mut buffer = Array1::zeros(3);
    let _ = interp.interp_into(1.0, buffer.view_mut());
}

#[test]
fn constant_segments() {
    let data = table();
    let interp = Interp1D::builder(data.view())
        .smoothness(Smoothness::ConstantSegments)
        .build()
        .unwrap();
    for row in data.rows() {
        assert_eq!(interp.value(1, row[0]).unwrap(), row[1]);
        assert_eq!(interp.value(2, row[0]).unwrap(), row[2]);
    }
    assert_eq!(interp.value(1, 1.999).unwrap(), 2.0);
    assert_eq!(interp.value(2, 3.5).unwrap(), 2.0);
    assert_eq!(interp.derivative(1, 2.5, 1.0).unwrap(), 0.0);
}

#[test]
fn linear_between_nodes() {
    let data = table();
    let interp = Interp1D::builder(data.view()).build().unwrap();
    for pair in data.windows((2, 3)) {
        let (x0, x1) = (pair[[0, 0]], pair[[1, 0]]);
        for frac in [0.1, 0.5, 0.9] {
            let u = x0 + frac * (x1 - x0);
            let expect = pair[[0, 1]] + frac * (pair[[1, 1]] - pair[[0, 1]]);
            assert_abs_diff_eq!(interp.value(1, u).unwrap(), expect, epsilon = 1e-12);
        }
    }
}

#[test]
fn query_order_does_not_matter() {
    let data = table();
    let interp = Interp1D::builder(data.view()).build().unwrap();
    let forward = [0.5, 1.5, 2.5, 3.5].map(|u| interp.value(1, u).unwrap());
    let backward = [3.5, 2.5, 1.5, 0.5].map(|u| interp.value(1, u).unwrap());
    assert_eq!(forward, [1.0, 2.5, 4.0, 6.0]);
    assert_eq!(backward, [6.0, 4.0, 2.5, 1.0]);
}

#[test]
fn extrapolate_last_two_points() {
    let data = table();
    let interp = Interp1D::builder(data.view()).build().unwrap();
    assert_eq!(interp.extrapolation(), Extrapolation::LastTwoPoints);
    assert_eq!(interp.value(1, 5.0).unwrap(), 9.0);
    assert_eq!(interp.value(1, -1.0).unwrap(), -2.0);
    assert_eq!(interp.derivative(1, 5.0, 1.0).unwrap(), 2.0);
    assert_eq!(interp.derivative(2, -1.0, 1.0).unwrap(), -0.5);
}

#[test]
fn extrapolate_hold_last_point() {
    let data = table();
    let interp = Interp1D::builder(data.view())
        .extrapolation(Extrapolation::HoldLastPoint)
        .build()
        .unwrap();
    assert_eq!(interp.value(1, 5.0).unwrap(), 7.0);
    assert_eq!(interp.value(2, -1.0).unwrap(), 1.0);
    assert_eq!(interp.derivative(1, 5.0, 1.0).unwrap(), 0.0);
}

#[test]
fn no_extrapolation() {
    let data = table();
    let interp = Interp1D::builder(data.view())
        .extrapolation(Extrapolation::NoExtrapolation)
        .build()
        .unwrap();
    assert_eq!(interp.value(1, 4.0).unwrap(), 7.0);

    let err = interp.value(1, 5.0).unwrap_err();
    assert!(matches!(err, InterpolateError::OutOfBounds(_)));
    assert_eq!(
        err.to_string(),
        "Extrapolation error: The value u (=5) must be less or equal than the maximum \
         abscissa value NoName(5,1) (=4)."
    );
    let err = interp.derivative(1, -0.5, 1.0).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Extrapolation error: The value u (=-0.5) must be greater or equal than the minimum \
         abscissa value NoName(1,1) (=0)."
    );
    assert!(interp.interp_array(&array![1.0, 5.0]).is_err());
}

#[test]
fn borrowed_table() {
    let data = table();
    let interp = Interp1D::builder(data.view())
        .no_copy(true)
        .build()
        .unwrap();
    assert!(!interp.table().is_owned());
    assert_eq!(interp.source(), TableSource::InMemory);
    assert_eq!(interp.value(1, 1.5).unwrap(), 2.5);

    let copied = Interp1D::builder(data.view()).build().unwrap();
    assert!(copied.table().is_owned());
}

#[test]
fn abscissa_range() {
    let data = table();
    let interp = Interp1D::builder(data.view()).build().unwrap();
    assert_eq!(interp.minimum_abscissa(), 0.0);
    assert_eq!(interp.maximum_abscissa(), 4.0);
}

#[test]
fn read_in_memory_is_noop() {
    let data = table();
    let mut interp = Interp1D::builder(data.view()).build().unwrap();
    interp.read(true).unwrap();
    assert_relative_eq!(interp.value(1, 1.5).unwrap(), 2.5);
}

#[test]
fn builder_errors() {
    let data = table();
    let err = Interp1D::builder(data.view())
        .columns(&[4])
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "The column index 4 is out of range for table matrix \"NoName(5,3)\"."
    );

    let err = Interp1D::builder(data.view())
        .extrapolation(Extrapolation::Periodic)
        .build()
        .unwrap_err();
    assert!(matches!(err, BuilderError::UnsupportedExtrapolation { .. }));

    let err = Interp1DBuilder::new(data.view())
        .file_name("table.txt")
        .build()
        .unwrap_err();
    assert!(matches!(err, BuilderError::FileWithoutTable(_)));

    let err = Interp1DBuilder::new(data.view())
        .table_name("tab1")
        .build()
        .unwrap_err();
    assert!(matches!(err, BuilderError::MissingProvider(_)));
}

#[test]
fn decreasing_abscissa() {
    let data = array![[0.0, 1.0], [2.0, 2.0], [1.0, 3.0]];
    let err = Interp1D::builder(data.view()).build().unwrap_err();
    assert!(matches!(err, BuilderError::Monotonic(_)));
    assert_eq!(
        err.to_string(),
        "The values of the first column of table \"NoName(3,2)\" are not strictly \
         increasing because NoName(2,1) (=2) >= NoName(3,1) (=1)."
    );
}
