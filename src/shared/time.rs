use chrono::{Local, Timelike};

/// A time of day in seconds since midnight. GTFS allows times past
/// 24:00:00 for trips that run over the date boundary, so this is not
/// clamped to one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time(u32);

impl From<u32> for Time {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Time {
    pub fn now() -> Self {
        Self(Local::now().num_seconds_from_midnight())
    }

    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    pub fn from_hms(time: &str) -> Option<Self> {
        let mut split = time.split(':');
        let hours: u32 = split.next()?.parse().ok()?;
        let minutes: u32 = split.next()?.parse().ok()?;
        let seconds: u32 = split.next()?.parse().ok()?;
        if split.next().is_some() || minutes > 59 || seconds > 59 {
            return None;
        }
        Some(Self(hours * 3600 + minutes * 60 + seconds))
    }

    pub fn to_hms_string(&self) -> String {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        format!("{:02}:{:02}:{:02}", h, m, s)
    }
}

#[test]
fn parse_midnight() {
    assert_eq!(Time::from_hms("00:00:00").unwrap().as_seconds(), 0);
}

#[test]
fn parse_morning() {
    assert_eq!(Time::from_hms("07:42:00").unwrap().as_seconds(), 27720);
}

#[test]
fn parse_past_midnight() {
    // Trips that roll over the service day keep counting hours
    assert_eq!(Time::from_hms("25:10:00").unwrap().as_seconds(), 90600);
}

#[test]
fn parse_unparse() {
    for time in ["00:00:30", "08:45:00", "12:30:30"] {
        assert_eq!(Time::from_hms(time).unwrap().to_hms_string(), time);
    }
}

#[test]
fn reject_missing_seconds() {
    assert!(Time::from_hms("08:45").is_none());
}

#[test]
fn reject_garbage() {
    assert!(Time::from_hms("08:45:0a").is_none());
    assert!(Time::from_hms("08:61:00").is_none());
}
