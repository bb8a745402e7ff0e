use crate::catalog::ScheduleEntry;
use chrono::NaiveDateTime;

/// Returns true when any schedule entry covers `now`.
///
/// Entries match on the full English weekday name and an inclusive lexical
/// comparison of zero-padded "HH:MM" strings, so both the start and the end
/// minute count as in-class. The result is informational only: it populates
/// the status snapshot and never gates the actuator decision.
pub fn is_active(schedule: &[ScheduleEntry], now: NaiveDateTime) -> bool {
    let day = now.format("%A").to_string();
    let time = now.format("%H:%M").to_string();

    schedule.iter().any(|entry| {
        entry.day == day
            && entry.start_time.as_str() <= time.as_str()
            && time.as_str() <= entry.end_time.as_str()
    })
}
