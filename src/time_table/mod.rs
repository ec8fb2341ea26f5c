//! Interpolation along a time column with time events
//!
//! A [`TimeTable`] is an [`Interp1D`] whose first column is the time. The
//! time values may repeat to define jumps, the table can be repeated
//! periodically and it is shifted by a start time.
//!
//! Interpolation is driven by the caller in steps: [`TimeTable::next_time_event`]
//! reports the next time at which the signal is not smooth. While the caller
//! iterates at such an event it passes the same event time as `next_time_event`
//! and `pre_next_time_event` to [`TimeTable::value`] and gets the value left of
//! the event. Once the event is accepted, the new event time is larger than
//! the previous one and the value right of the event is returned. Between
//! events both arguments are the time of the upcoming event.
//!
//! ```rust
//! # use ndarray_tables::*;
//! # use ndarray::*;
//! let table = array![
//!     [0.0, 0.0],
//!     [1.0, 1.0],
//!     [1.0, 2.0],
//!     [2.0, 2.0],
//! ];
//! let mut time_table = TimeTableBuilder::new(table.view()).build().unwrap();
//! let event = time_table.next_time_event(0.0);
//! assert_eq!(event, 1.0);
//! // iterating at the event
//! assert_eq!(time_table.value(1, 1.0, event, event).unwrap(), 1.0);
//! // after the event
//! let next = time_table.next_time_event(1.0);
//! assert_eq!(time_table.value(1, 1.0, next, event).unwrap(), 2.0);
//! ```
use ndarray::{ArrayView1, ArrayView2};

use crate::{
    interp1d::Interp1D,
    io::{CsvOptions, TableKind, TableProvider, TableSpec},
    BuilderError, Extrapolation, InterpolateError, Position, Smoothness, TableMatrix, TableSource,
};

mod events;

use events::{find_pre_row_index, EventTracker};
pub use events::NO_EVENT;

/// A table interpolated along its time column
#[derive(Debug)]
pub struct TimeTable<'a> {
    inner: Interp1D<'a>,
    start_time: f64,
    events: EventTracker,
}

impl<'a> TimeTable<'a> {
    /// Get the [`TimeTableBuilder`] for an in-memory table
    pub fn builder(table: ArrayView2<'a, f64>) -> TimeTableBuilder<'a> {
        TimeTableBuilder::new(table)
    }

    /// Interpolated value of the selected column `i_col` (1-based) at time `t`.
    ///
    /// `next_time_event` is the last result of [`next_time_event`](TimeTable::next_time_event),
    /// `pre_next_time_event` the one before. They are compared exactly, equal values
    /// mean the caller iterates at an event and the value left of it is returned.
    ///
    /// Before the start time the value is `0.0`.
    pub fn value(
        &self,
        i_col: usize,
        t: f64,
        next_time_event: f64,
        pre_next_time_event: f64,
    ) -> Result<f64, InterpolateError> {
        let (sel, col) = self.inner.select(i_col)?;
        let t_old = t;
        let mut t = t - self.start_time;
        if t < 0.0 || self.at_start_event(next_time_event, pre_next_time_event) {
            return Ok(0.0);
        }
        let table = self.inner.table.view();
        let (x, y) = (table.column(0), table.column(col));
        let n = x.len();
        if n == 1 {
            return Ok(y[0]);
        }
        let strategy = &self.inner.strategy;
        let smoothness = strategy.smoothness();

        if self.inner.extrapolation == Extrapolation::Periodic {
            if let Some((i0, i1)) = self.events.interval() {
                if next_time_event == pre_next_time_event && t_old >= next_time_event {
                    // iterating at the end of the interval
                    let i = if smoothness == Smoothness::ConstantSegments {
                        i0
                    } else {
                        i1
                    };
                    return Ok(y[i]);
                }
                if self.in_event_iteration(t_old, next_time_event, pre_next_time_event) {
                    return Ok(y[i0]);
                }
                t = self.clamp_to_interval(t, i0, i1);
            } else {
                t = fold(t, x[0], x[n - 1]);
            }
            let last = self.inner.locate(t);
            return Ok(strategy.interpolate(x, y, sel, last, t));
        }

        let before_event = next_time_event < NO_EVENT
            && next_time_event == pre_next_time_event
            && t_old >= next_time_event;
        match self.inner.position(t) {
            Position::Left => self.extrapolate(x, y, sel, Position::Left, t),
            Position::Right if !before_event => self.extrapolate(x, y, sel, Position::Right, t),
            _ => {
                let last = self.inner.locate(t);
                if before_event {
                    let last = if t >= x[n - 1] { n - 1 } else { last };
                    return Ok(y[find_pre_row_index(x, smoothness, last)]);
                }
                Ok(strategy.interpolate(x, y, sel, last, t))
            }
        }
    }

    /// Derivative of [`value`](TimeTable::value) with respect to time,
    /// where `der_t` is the derivative of `t`.
    pub fn derivative(
        &self,
        i_col: usize,
        t: f64,
        next_time_event: f64,
        pre_next_time_event: f64,
        der_t: f64,
    ) -> Result<f64, InterpolateError> {
        let (sel, col) = self.inner.select(i_col)?;
        let t_old = t;
        let mut t = t - self.start_time;
        if t < 0.0 || self.at_start_event(next_time_event, pre_next_time_event) {
            return Ok(0.0);
        }
        let table = self.inner.table.view();
        let (x, y) = (table.column(0), table.column(col));
        let n = x.len();
        if n == 1 {
            return Ok(0.0);
        }
        let strategy = &self.inner.strategy;

        if self.inner.extrapolation == Extrapolation::Periodic {
            let last = match self.events.interval() {
                Some((_, i1)) if next_time_event == pre_next_time_event && t_old >= next_time_event => {
                    t = x[i1];
                    i1.saturating_sub(1)
                }
                Some((i0, _)) if self.in_event_iteration(t_old, next_time_event, pre_next_time_event) => {
                    t = x[i0];
                    i0
                }
                Some((i0, i1)) => {
                    t = self.clamp_to_interval(t, i0, i1);
                    self.inner.locate(t)
                }
                None => {
                    t = fold(t, x[0], x[n - 1]);
                    self.inner.locate(t)
                }
            };
            return Ok(strategy.derivative(x, y, sel, last.min(n - 2), t) * der_t);
        }

        let before_event = next_time_event < NO_EVENT
            && next_time_event == pre_next_time_event
            && t_old >= next_time_event;
        let mut position = self.inner.position(t);
        if position == Position::Right && before_event {
            position = Position::InTable;
        }
        let mut last = 0;
        if position == Position::InTable {
            last = self.inner.locate(t);
            if before_event {
                if t >= x[n - 1] {
                    last = n - 1;
                }
                last = find_pre_row_index(x, strategy.smoothness(), last);
                if last == 0 && self.events.n_event == 1 {
                    position = Position::Left;
                } else {
                    last = last.saturating_sub(1);
                }
            }
        }

        let der_y = match position {
            Position::InTable => strategy.derivative(x, y, sel, last.min(n - 2), t),
            position => match self.inner.extrapolation {
                Extrapolation::HoldLastPoint => 0.0,
                Extrapolation::NoExtrapolation => {
                    return Err(self.inner.out_of_bounds("Time", t, position))
                }
                _ => strategy.extrapolate_derivative(x, y, sel, position),
            },
        };
        Ok(der_y * der_t)
    }

    /// The next time event after `t`, or [`NO_EVENT`].
    ///
    /// Calls with a time not after the previous call return the cached event.
    pub fn next_time_event(&mut self, t: f64) -> f64 {
        let table = self.inner.table.view();
        self.events.next_time_event(
            table.column(0),
            self.inner.strategy.smoothness(),
            self.inner.extrapolation,
            self.start_time,
            &self.inner.last,
            t,
        )
    }

    /// The first time of the table, not shifted by the start time
    pub fn minimum_time(&self) -> f64 {
        self.inner.minimum_abscissa()
    }

    /// The last time of the table, not shifted by the start time
    pub fn maximum_time(&self) -> f64 {
        self.inner.maximum_abscissa()
    }

    /// Read the table again from its file when `force` is set.
    /// The time events start over after a new table was read.
    pub fn read(&mut self, force: bool) -> Result<(), BuilderError> {
        if force && self.inner.source() == TableSource::File {
            self.inner.read(force)?;
            self.events = EventTracker::default();
        }
        Ok(())
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn table(&self) -> &TableMatrix<'a> {
        self.inner.table()
    }

    pub fn source(&self) -> TableSource {
        self.inner.source()
    }

    pub fn smoothness(&self) -> Smoothness {
        self.inner.smoothness()
    }

    pub fn extrapolation(&self) -> Extrapolation {
        self.inner.extrapolation()
    }

    pub fn columns(&self) -> &[usize] {
        self.inner.columns()
    }

    pub fn table_name(&self) -> &str {
        self.inner.table_name()
    }

    pub fn file_name(&self) -> &str {
        self.inner.file_name()
    }

    /// Iteration at the event at the start time
    fn at_start_event(&self, next_time_event: f64, pre_next_time_event: f64) -> bool {
        next_time_event < NO_EVENT
            && next_time_event == pre_next_time_event
            && self.start_time >= next_time_event
    }

    /// Iteration at an event that is not the start time event
    fn in_event_iteration(&self, t_old: f64, next_time_event: f64, pre_next_time_event: f64) -> bool {
        next_time_event > pre_next_time_event
            && t_old >= pre_next_time_event
            && self.start_time < pre_next_time_event
    }

    /// Map `t` into the current period and keep it inside the rows `i0..=i1`
    /// of the current event interval
    fn clamp_to_interval(&self, t: f64, i0: usize, i1: usize) -> f64 {
        let table = self.inner.table.view();
        let x = table.column(0);
        let (t_min, t_max) = (x[0], x[x.len() - 1]);
        let period = t_max - t_min;

        let mut t = t - self.events.t_offset;
        if t < t_min {
            t += period;
        } else if t > t_max {
            t -= period;
        }
        if t < t_min || t > t_max {
            t = fold(t, t_min, t_max);
        }

        let last = self.inner.locate(t);
        if last < i0 {
            t = x[i0];
        }
        if last >= i1 {
            t = if self.events.event_interval == 1 {
                x[i0]
            } else {
                x[i1]
            };
        }
        t
    }

    fn extrapolate(
        &self,
        x: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        sel: usize,
        position: Position,
        t: f64,
    ) -> Result<f64, InterpolateError> {
        match self.inner.extrapolation {
            Extrapolation::HoldLastPoint if position == Position::Left => Ok(y[0]),
            Extrapolation::HoldLastPoint => Ok(y[y.len() - 1]),
            Extrapolation::NoExtrapolation => Err(self.inner.out_of_bounds("Time", t, position)),
            _ => Ok(self.inner.strategy.extrapolate(x, y, sel, position, t)),
        }
    }
}

/// Fold `t` into the period `[t_min, t_max]`
fn fold(t: f64, t_min: f64, t_max: f64) -> f64 {
    t_min + (t - t_min).rem_euclid(t_max - t_min)
}

/// Create and configure a [`TimeTable`].
///
/// # Default configuration
///  - all columns except the first one are selected
///  - [`Smoothness::LinearSegments`]
///  - [`Extrapolation::HoldLastPoint`]
///  - start time `0.0`
///  - in-memory tables are copied
#[derive(Debug)]
pub struct TimeTableBuilder<'a> {
    spec: TableSpec<'a>,
    columns: Option<Vec<usize>>,
    smoothness: Smoothness,
    extrapolation: Extrapolation,
    start_time: f64,
}

impl<'a> TimeTableBuilder<'a> {
    /// Create a new [`TimeTableBuilder`] for an in-memory table
    pub fn new(table: ArrayView2<'a, f64>) -> Self {
        Self::with_spec(TableSpec::from_data(table))
    }

    /// Read the table `table_name` from `file_name` on [`build`](TimeTableBuilder::build)
    pub fn from_file(table_name: &str, file_name: &str) -> Self {
        Self::with_spec(TableSpec::from_file(table_name, file_name))
    }

    /// Request the table `table_name` from `provider` on [`build`](TimeTableBuilder::build)
    pub fn from_provider(table_name: &str, provider: &'a dyn TableProvider) -> Self {
        Self::with_spec(TableSpec::from_provider(table_name, provider))
    }

    fn with_spec(spec: TableSpec<'a>) -> Self {
        TimeTableBuilder {
            spec,
            columns: None,
            smoothness: Smoothness::default(),
            extrapolation: Extrapolation::HoldLastPoint,
            start_time: 0.0,
        }
    }

    pub fn table_name(mut self, table_name: &str) -> Self {
        self.spec.table_name = table_name.into();
        self
    }

    pub fn file_name(mut self, file_name: &str) -> Self {
        self.spec.file_name = file_name.into();
        self
    }

    pub fn provider(mut self, provider: &'a dyn TableProvider) -> Self {
        self.spec.provider = Some(provider);
        self
    }

    /// Borrow in-memory data instead of copying it
    pub fn no_copy(mut self, no_copy: bool) -> Self {
        self.spec.copy = !no_copy;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.spec.verbose = verbose;
        self
    }

    pub fn csv_options(mut self, options: CsvOptions) -> Self {
        self.spec.csv = options;
        self
    }

    /// Select the 1-based table columns that are interpolated
    pub fn columns(mut self, columns: &[usize]) -> Self {
        self.columns = Some(columns.to_vec());
        self
    }

    pub fn smoothness(mut self, smoothness: Smoothness) -> Self {
        self.smoothness = smoothness;
        self
    }

    pub fn extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Shift the table by `start_time`
    pub fn start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    /// Load and validate the table and create the configured [`TimeTable`]
    pub fn build(self) -> Result<TimeTable<'a>, BuilderError> {
        let TimeTableBuilder {
            spec,
            columns,
            smoothness,
            extrapolation,
            start_time,
        } = self;
        let inner = Interp1D::load(spec, TableKind::Time, columns, smoothness, extrapolation)?;
        Ok(TimeTable {
            inner,
            start_time,
            events: EventTracker::default(),
        })
    }
}
