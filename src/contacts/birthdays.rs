//! Year-independent birthday window.
//!
//! Dates are reduced to a `month * 100 + day` key (Jan 2 -> 102, Dec 31 -> 1231)
//! so the window can be matched against any year of birth. The window is
//! inclusive on both ends: `[today, today + days]`.

use time::{util::is_leap_year, Date, Month};

pub const DEFAULT_WINDOW_DAYS: u32 = 7;

pub fn month_day_key(date: Date) -> i32 {
    i32::from(u8::from(date.month())) * 100 + i32::from(date.day())
}

/// Month/day keys covered by the window starting at `today`.
///
/// Walking the calendar handles year-end wraparound. When the window runs
/// past Feb 28 of a non-leap year, Feb 29 is included as well so leap-day
/// birthdays are not skipped in those years. A window ending on Feb 28 does
/// not include it.
pub fn window_keys(today: Date, days: u32) -> Vec<i32> {
    let mut keys = Vec::with_capacity(days as usize + 2);
    let mut date = today;
    for step in 0..=days {
        keys.push(month_day_key(date));
        if step < days
            && date.month() == Month::February
            && date.day() == 28
            && !is_leap_year(date.year())
        {
            keys.push(229);
        }
        if step == days {
            break;
        }
        match date.next_day() {
            Some(next) => date = next,
            None => break,
        }
    }
    keys
}
