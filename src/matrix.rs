use ndarray::{Array2, ArrayView2, CowArray, Ix2};

/// Where the data of a table comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    /// Data handed to the builder, copied or borrowed
    InMemory,
    /// Data read from a text, CSV or MAT-file
    File,
    /// Row-major data of a [`TableProvider`](crate::io::TableProvider)
    Provider,
    /// Column-major data of a [`TableProvider`](crate::io::TableProvider),
    /// transposed into an owned buffer
    ProviderTransposed,
}

/// The row-major matrix of a table.
///
/// The storage is either borrowed from the caller or owned by the table,
/// so dropping a table never frees memory it does not own.
#[derive(Debug)]
pub struct TableMatrix<'a> {
    data: CowArray<'a, f64, Ix2>,
    source: TableSource,
}

impl<'a> TableMatrix<'a> {
    pub(crate) fn new(data: CowArray<'a, f64, Ix2>, source: TableSource) -> Self {
        TableMatrix { data, source }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn source(&self) -> TableSource {
        self.source
    }

    /// `true` when the table owns its data
    pub fn is_owned(&self) -> bool {
        self.data.is_owned()
    }

    pub fn into_owned(self) -> Array2<f64> {
        self.data.into_owned()
    }
}

/// Transpose the `rows x cols` row-major matrix stored in `data` in place
/// into the `cols x rows` row-major matrix.
///
/// Every element is moved along its permutation cycle, each cycle is
/// processed once starting from its smallest index.
///
/// # Panics
/// when `data.len() != rows * cols`
pub fn transpose_in_place(data: &mut [f64], rows: usize, cols: usize) {
    assert_eq!(data.len(), rows * cols, "matrix buffer does not match its shape");
    let n = rows * cols;
    if n < 3 {
        return;
    }
    // element at position i of the result comes from position source(i)
    let source = |i: usize| cols * (i % rows) + i / rows;
    for i in 1..n - 1 {
        let mut x = source(i);
        if x <= i {
            continue;
        }
        while x > i {
            x = source(x);
        }
        if x < i {
            continue;
        }
        let tmp = data[i];
        let mut s = i;
        let mut x = source(i);
        while x != i {
            data[s] = data[x];
            s = x;
            x = source(x);
        }
        data[s] = tmp;
    }
}
