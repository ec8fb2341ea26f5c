use approx::assert_abs_diff_eq;
use ndarray::array;
use ndarray_tables::{Extrapolation, TimeTableBuilder, NO_EVENT};

/// A fixed step simulator driving a periodic time table with a jump.
///
/// Between events the table is evaluated with the upcoming event as both
/// event arguments. At an event the value left of the jump is taken first,
/// then the next event is requested and the value right of the jump follows.
fn main() {
    // a saw tooth with period 2: rises from 0 to 1, jumps to -1 and rises to 0
    let data = array![[0.0, 0.0], [1.0, 1.0], [1.0, -1.0], [2.0, 0.0]];
    let mut table = TimeTableBuilder::new(data.view())
        .extrapolation(Extrapolation::Periodic)
        .build()
        .unwrap();

    let h = 0.25;
    let mut t = 0.0;
    let mut event = table.next_time_event(t);
    let mut jumps = Vec::new();
    while t < 4.0 {
        let t_next = (t + h).min(event);
        let value = table.value(1, t_next, event, event).unwrap();
        t = t_next;
        println!("t = {t:5.2}  y = {value:6.3}");
        if t >= event && event < NO_EVENT {
            let pre_event = event;
            event = table.next_time_event(t);
            let right = table.value(1, t, event, pre_event).unwrap();
            println!("t = {t:5.2}  y = {right:6.3}  (event, next at {event})");
            jumps.push((t, value, right));
        }
    }

    assert_eq!(jumps.len(), 4);
    for (i, &(t, left, right)) in jumps.iter().enumerate() {
        assert_abs_diff_eq!(t, (i + 1) as f64);
        if i % 2 == 0 {
            // the jump of the saw tooth
            assert_abs_diff_eq!(left, 1.0);
            assert_abs_diff_eq!(right, -1.0);
        } else {
            // the end of the period
            assert_abs_diff_eq!(left, 0.0);
            assert_abs_diff_eq!(right, 0.0);
        }
    }
}
