//! Extensions for the coordinate vectors of a table
use ndarray::{ArrayBase, Data, Ix1};
use num_traits::Float;

/// Relative tolerance used to compare coordinates
pub const EPSILON: f64 = 1e-10;

/// `true` when `x` and `y` differ by less than [`EPSILON`] relative to their magnitude
pub fn is_nearly_equal(x: f64, y: f64) -> bool {
    let cmp = x.abs().max(y.abs()).max(EPSILON) * EPSILON;
    (y - x).abs() < cmp
}

pub trait VectorExtensions<T> {
    /// get the monotonic property of the vector
    fn monotonic_prop(&self) -> Monotonic;

    /// The first index `i` that violates the requested ordering,
    /// `self[i] > self[i + 1]` or with `strict` also `self[i] == self[i + 1]`
    fn first_violation(&self, strict: bool) -> Option<usize>;

    /// Find the interval `i` with `self[i] <= x < self[i + 1]`.
    ///
    /// The interval starting at `last` is checked first, so repeated queries
    /// close to each other are answered in constant time. Values left of the
    /// vector map to `0`, values right of it to `len - 2`.
    ///
    /// # Panics
    /// when the vector has less than two elements
    fn find_index(&self, last: usize, x: T) -> usize;
}

/// Describes the monotonic property of a vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Monotonic {
    Rising { strict: bool },
    Falling { strict: bool },
    NotMonotonic,
}

impl<S, T> VectorExtensions<T> for ArrayBase<S, Ix1>
where
    S: Data<Elem = T>,
    T: Float,
{
    fn monotonic_prop(&self) -> Monotonic {
        if self.len() <= 1 {
            return Monotonic::Rising { strict: true };
        }
        let mut rising = true;
        let mut falling = true;
        let mut strict = true;
        for pair in self.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a < b {
                falling = false;
            } else if a > b {
                rising = false;
            } else {
                strict = false;
            }
        }
        match (rising, falling) {
            (true, _) => Monotonic::Rising { strict },
            (_, true) => Monotonic::Falling { strict },
            _ => Monotonic::NotMonotonic,
        }
    }

    fn first_violation(&self, strict: bool) -> Option<usize> {
        self.windows(2)
            .into_iter()
            .position(|pair| pair[0] > pair[1] || (strict && pair[0] >= pair[1]))
    }

    fn find_index(&self, last: usize, x: T) -> usize {
        let n = self.len();
        assert!(n >= 2, "find_index needs at least two coordinates");
        let last = last.min(n - 2);
        let mut i0 = 0;
        let mut i1 = n - 1;
        if x < self[last] {
            i1 = last;
        } else if x >= self[last + 1] {
            i0 = last;
        } else {
            return last;
        }

        while i1 > i0 + 1 {
            let i = (i0 + i1) / 2;
            if x < self[i] {
                i1 = i;
            } else {
                i0 = i;
            }
        }
        i0.min(n - 2)
    }
}
