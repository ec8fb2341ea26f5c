//! Time events of a [`TimeTable`](super::TimeTable)
//!
//! A time event is a time at which the interpolated signal is not smooth:
//! the start time, a jump of the table (two rows with the same time), every
//! node of a table with constant segments and the end of the table or of a
//! period.
use std::cell::Cell;

use log::debug;
use ndarray::ArrayView1;

use crate::{
    vector_extensions::{is_nearly_equal, VectorExtensions, EPSILON},
    Extrapolation, Smoothness,
};

/// Returned by [`TimeTable::next_time_event`](super::TimeTable::next_time_event)
/// when no further time event exists
pub const NO_EVENT: f64 = f64::MAX;

/// `true` when a period has a time event at the end of `[t0, t1]`
fn ends_interval(smoothness: Smoothness, t0: f64, t1: f64) -> bool {
    if smoothness == Smoothness::ConstantSegments {
        !is_nearly_equal(t0, t1)
    } else {
        is_nearly_equal(t0, t1)
    }
}

/// `true` when the signal is not smooth at the node `t0` followed by `t1`
fn is_event_node(smoothness: Smoothness, t0: f64, t1: f64) -> bool {
    smoothness == Smoothness::ConstantSegments || is_nearly_equal(t0, t1)
}

/// The next node after `t`, starting the search in interval `start`,
/// at which the signal is not smooth
fn next_event_node(x: ArrayView1<'_, f64>, smoothness: Smoothness, start: usize, t: f64) -> Option<f64> {
    let n = x.len();
    (start + 1..n - 1)
        .find(|&i| x[i] > t && is_event_node(smoothness, x[i], x[i + 1]))
        .map(|i| x[i])
}

/// The row whose value is valid just before the jump at row `last`
pub(crate) fn find_pre_row_index(x: ArrayView1<'_, f64>, smoothness: Smoothness, last: usize) -> usize {
    for i in (1..=last).rev() {
        if !is_nearly_equal(x[i - 1], x[i]) {
            return if smoothness == Smoothness::ConstantSegments {
                i - 1
            } else {
                i
            };
        }
    }
    last
}

/// Bookkeeping of the time events reported to the caller
#[derive(Debug, Clone, Default)]
pub(crate) struct EventTracker {
    /// number of increasing events reported so far
    pub n_event: usize,
    pub pre_next_time_event: f64,
    pub pre_next_time_event_called: f64,
    /// start of the current period, periodic tables only
    pub t_offset: f64,
    /// 1-based index into `intervals`, `0` before the first periodic event
    pub event_interval: usize,
    pub n_events_per_period: usize,
    /// `(left, right)` rows of the smooth intervals of one period
    pub intervals: Vec<(usize, usize)>,
}

impl EventTracker {
    /// The current event interval of a periodic table
    pub fn interval(&self) -> Option<(usize, usize)> {
        self.event_interval
            .checked_sub(1)
            .and_then(|i| self.intervals.get(i))
            .copied()
    }

    pub fn next_time_event(
        &mut self,
        x: ArrayView1<'_, f64>,
        smoothness: Smoothness,
        extrapolation: Extrapolation,
        start_time: f64,
        last: &Cell<usize>,
        t: f64,
    ) -> f64 {
        if self.n_event > 0 {
            if t > self.pre_next_time_event_called {
                self.pre_next_time_event_called = t;
            } else {
                return self.pre_next_time_event;
            }
        }

        let periodic = extrapolation == Extrapolation::Periodic;
        if periodic && self.n_event == 0 {
            self.split_period(x, smoothness);
        }

        let n = x.len();
        let (t_min, t_max) = (x[0], x[n - 1]);
        let period = t_max - t_min;
        let t_shifted = t - start_time;
        let mut next = NO_EVENT;
        if t_shifted < 0.0 {
            next = 0.0;
        } else if periodic {
            if self.event_interval == 0 {
                next = self.start_period(x, smoothness, last, t_shifted);
            } else {
                self.event_interval = 1 + self.event_interval % self.n_events_per_period;
                if self.event_interval == self.n_events_per_period {
                    next = t_max + self.t_offset;
                    self.t_offset += period;
                } else {
                    let i = self.intervals[self.event_interval - 1].1;
                    next = x[i] + self.t_offset;
                }
            }
        } else if n > 1 {
            if t_shifted < t_min {
                next = t_min;
            } else if t_shifted < t_max {
                next = t_max;
                if smoothness != Smoothness::ContinuousDerivative {
                    let start = x.find_index(last.get(), t_shifted + EPSILON * period);
                    if let Some(node) = next_event_node(x, smoothness, start, t_shifted) {
                        next = node;
                    }
                }
            }
        }

        next += start_time;
        if next > self.pre_next_time_event {
            self.pre_next_time_event = next;
            self.n_event += 1;
        }

        if next < NO_EVENT {
            debug!("At time {t}: {}. time event at {next}", self.n_event);
        } else {
            debug!("No more time events for time > {t}");
        }
        next
    }

    /// Count the time events of one period and store its smooth intervals
    fn split_period(&mut self, x: ArrayView1<'_, f64>, smoothness: Smoothness) {
        let n = x.len();
        let t_max = x[n - 1];
        let mut t_event = x[0];
        // the end of the period is always an event
        self.n_events_per_period = 1;
        for i in 0..n - 1 {
            let (t0, t1) = (x[i], x[i + 1]);
            if t1 > t_event && !is_nearly_equal(t1, t_max) && ends_interval(smoothness, t0, t1) {
                t_event = t1;
                self.n_events_per_period += 1;
            }
        }

        let count = self.n_events_per_period;
        let mut intervals = vec![(0, 0); count];
        let mut k = 0;
        t_event = x[0];
        for i in 0..n - 1 {
            if k >= count {
                break;
            }
            let (t0, t1) = (x[i], x[i + 1]);
            let jump = is_nearly_equal(t0, t1);
            match (smoothness == Smoothness::ConstantSegments, t1 > t_event) {
                (true, true) if !jump => {
                    t_event = t1;
                    intervals[k] = (i, i + 1);
                    k += 1;
                }
                (true, true) => intervals[k].0 = i + 1,
                (true, false) => intervals[k].1 = i + 1,
                (false, true) if jump => {
                    t_event = t1;
                    intervals[k].1 = i;
                    k += 1;
                    if k < count {
                        intervals[k].0 = i + 1;
                    }
                }
                (false, true) => intervals[k].1 = i + 1,
                (false, false) => intervals[k].0 = i + 1,
            }
        }
        self.intervals = intervals;
    }

    /// Find the period and the event interval of `t` on the first event query
    fn start_period(
        &mut self,
        x: ArrayView1<'_, f64>,
        smoothness: Smoothness,
        last: &Cell<usize>,
        t: f64,
    ) -> f64 {
        let n = x.len();
        let (t_min, t_max) = (x[0], x[n - 1]);
        let period = t_max - t_min;

        self.t_offset = ((t - t_min) / period).floor() * period;
        let mut t = t - self.t_offset;
        if t < t_min {
            t += period;
        } else if t > t_max {
            t -= period;
        }
        let start = x.find_index(last.get(), t + EPSILON * period);
        let next = next_event_node(x, smoothness, start, t).unwrap_or(t_max);

        self.event_interval = 1;
        let mut t_event = t_min;
        for i in 0..start.min(n - 1) {
            let (t0, t1) = (x[i], x[i + 1]);
            if t1 > t_event && !is_nearly_equal(t1, t_max) && ends_interval(smoothness, t0, t1) {
                t_event = t1;
                self.event_interval += 1;
            }
        }

        let next = next + self.t_offset;
        if self.event_interval == self.n_events_per_period {
            self.t_offset += period;
        }
        next
    }
}
