//! Serde adapters for the calendar types exchanged with clients.
//! Dates travel as `YYYY-MM-DD`, meal times as `HH:MM`.

use time::{format_description::FormatItem, macros::format_description};

const DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const CLOCK: &[FormatItem<'static>] = format_description!("[hour]:[minute]");

pub fn parse_date(text: &str) -> Result<time::Date, time::error::Parse> {
    time::Date::parse(text, DATE)
}

pub mod iso_date {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        let text = date.format(super::DATE).map_err(ser::Error::custom)?;
        s.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let text = String::deserialize(d)?;
        super::parse_date(&text).map_err(de::Error::custom)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Date;

        pub fn serialize<S: Serializer>(date: &Option<Date>, s: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => super::serialize(d, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(text) => super::super::parse_date(&text)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }

    /// Absent stays `None`; `null` becomes `Some(None)`.
    pub mod nullable {
        use serde::Deserializer;
        use time::Date;

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<Date>>, D::Error> {
            super::option::deserialize(d).map(Some)
        }
    }
}

/// For patch fields that can be cleared: use with
/// `#[serde(default, deserialize_with = "nullable::deserialize")]` so an absent
/// field reads `None` and an explicit `null` reads `Some(None)`.
pub mod nullable {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(d).map(Some)
    }
}

pub mod clock_time {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};
    use time::Time;

    pub fn serialize<S: Serializer>(t: &Time, s: S) -> Result<S::Ok, S::Error> {
        let text = t.format(super::CLOCK).map_err(ser::Error::custom)?;
        s.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Time, D::Error> {
        let text = String::deserialize(d)?;
        Time::parse(&text, super::CLOCK).map_err(de::Error::custom)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer};
        use time::Time;

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Time>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(text) => Time::parse(&text, super::super::CLOCK)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use time::macros::{date, time};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Slot {
        #[serde(with = "super::iso_date")]
        day: time::Date,
        #[serde(with = "super::clock_time")]
        at: time::Time,
        #[serde(default, with = "super::iso_date::option")]
        until: Option<time::Date>,
    }

    #[test]
    fn dates_and_times_use_short_text_forms() {
        let slot = Slot {
            day: date!(2024 - 03 - 09),
            at: time!(7:05),
            until: None,
        };
        let json = serde_json::to_string(&slot).unwrap();
        assert_eq!(json, r#"{"day":"2024-03-09","at":"07:05","until":null}"#);

        let back: Slot = serde_json::from_str(r#"{"day":"2024-03-09","at":"07:05"}"#).unwrap();
        assert_eq!(back, slot);
    }

    #[derive(Debug, Default, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::nullable::deserialize")]
        target: Option<Option<f64>>,
        #[serde(default, deserialize_with = "super::iso_date::nullable::deserialize")]
        until: Option<Option<time::Date>>,
    }

    #[test]
    fn null_clears_and_absent_keeps() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.target, None);
        assert_eq!(absent.until, None);

        let cleared: Patch = serde_json::from_str(r#"{"target":null,"until":null}"#).unwrap();
        assert_eq!(cleared.target, Some(None));
        assert_eq!(cleared.until, Some(None));

        let set: Patch = serde_json::from_str(r#"{"target":120.5,"until":"2024-06-01"}"#).unwrap();
        assert_eq!(set.target, Some(Some(120.5)));
        assert_eq!(set.until, Some(Some(date!(2024 - 06 - 01))));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let res = serde_json::from_str::<Slot>(r#"{"day":"09/03/2024","at":"07:05"}"#);
        assert!(res.is_err());
    }
}
