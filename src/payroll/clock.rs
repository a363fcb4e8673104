use chrono::{Local, NaiveDateTime};

/// Wall clock seen by the payroll time gate and scheduler.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Server local time.
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
pub struct FixedClock(pub NaiveDateTime);

#[cfg(test)]
impl FixedClock {
    pub fn at(hour: u32, minute: u32, second: u32) -> Self {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 31).expect("valid date");
        Self(date.and_hms_opt(hour, minute, second).expect("valid time"))
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
