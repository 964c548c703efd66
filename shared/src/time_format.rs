use crate::time::{US_PER_MILLISECOND, US_PER_SECOND};

/// Format elapsed microseconds with the largest fitting unit (us, ms, s).
///
/// Values below a millisecond are shown as whole microseconds; larger values
/// keep whatever fraction plain division leaves (`1500.0` -> `"1.5ms"`).
/// The sign is preserved for times left of the kernel origin.
pub fn format_elapsed(us: f64) -> String {
    let magnitude = us.abs();
    if magnitude < US_PER_MILLISECOND {
        format!("{}us", us.trunc() as i64)
    } else if magnitude < US_PER_SECOND {
        format!("{}ms", us / US_PER_MILLISECOND)
    } else {
        format!("{}s", us / US_PER_SECOND)
    }
}
