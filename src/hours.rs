use std::{collections::BTreeMap, fmt, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Matches English day labels as the places service prints them ("Monday"), or their short form.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|day| {
            day.label().eq_ignore_ascii_case(label) || day.short_label().eq_ignore_ascii_case(label)
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    pub fn short_label(self) -> &'static str {
        &self.label()[..3]
    }
}

/// Stored opening hours: lowercase weekday to `"9:00am-5:00pm"`, `None` for days without hours.
pub type OpeningHours = BTreeMap<Weekday, Option<String>>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl Meridiem {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "AM" => Some(Meridiem::Am),
            "PM" => Some(Meridiem::Pm),
            _ => None,
        }
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        })
    }
}

/// One day of a candidate's hours, split the way the authoring form edits them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    pub open: String,
    #[serde(rename = "openAmpm", alias = "openMeridiem")]
    pub open_meridiem: Meridiem,
    pub close: String,
    #[serde(rename = "closeAmpm", alias = "closeMeridiem")]
    pub close_meridiem: Meridiem,
}

impl DayHours {
    /// Wire form stored on a place, `None` when either end is not a valid 12-hour time.
    pub fn to_range_string(&self) -> Option<String> {
        let open = clock_time(&self.open, self.open_meridiem)?;
        let close = clock_time(&self.close, self.close_meridiem)?;
        Some(format!("{open}-{close}"))
    }
}

pub type WeeklyHours = BTreeMap<Weekday, DayHours>;

/// Outcome of reading one weekday description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayParse {
    Open(Weekday, DayHours),
    Closed(Weekday),
    Unparsable,
}

fn description_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\w+):\s*(.+)$").expect("valid day pattern"))
}

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^([0-9]{1,2}):?([0-9]{2})?\s*(AM|PM)\s*[–-]\s*([0-9]{1,2}):?([0-9]{2})?\s*(AM|PM)")
            .expect("valid range pattern")
    })
}

/// Reads `"Monday: 9:00 AM – 5:00 PM"` style text.
pub fn parse_day_description(description: &str) -> DayParse {
    let Some(captures) = description_pattern().captures(description.trim()) else {
        return DayParse::Unparsable;
    };
    let Some(day) = Weekday::from_label(&captures[1]) else {
        return DayParse::Unparsable;
    };
    let remainder = captures[2].trim();
    if remainder.eq_ignore_ascii_case("closed") {
        return DayParse::Closed(day);
    }
    let Some(range) = range_pattern().captures(remainder) else {
        return DayParse::Unparsable;
    };
    let minutes = |index: usize| range.get(index).map_or("00", |m| m.as_str());
    let (Some(open_meridiem), Some(close_meridiem)) =
        (Meridiem::parse(&range[3]), Meridiem::parse(&range[6]))
    else {
        return DayParse::Unparsable;
    };
    DayParse::Open(
        day,
        DayHours {
            open: format!("{}:{}", &range[1], minutes(2)),
            open_meridiem,
            close: format!("{}:{}", &range[4], minutes(5)),
            close_meridiem,
        },
    )
}

/// Parses weekday descriptions, keeping only days with a readable open range.
///
/// Closed and unreadable days are both left out of the result; `None` when no day parsed.
pub fn parse_weekday_descriptions<S: AsRef<str>>(descriptions: &[S]) -> Option<WeeklyHours> {
    let hours: WeeklyHours = descriptions
        .iter()
        .filter_map(|description| match parse_day_description(description.as_ref()) {
            DayParse::Open(day, hours) => Some((day, hours)),
            DayParse::Closed(_) => None,
            DayParse::Unparsable => {
                debug!("skipping unreadable hours {:?}", description.as_ref());
                None
            }
        })
        .collect();
    (!hours.is_empty()).then_some(hours)
}

/// `"9"` / `"9:5"` / `"09:30"` with a meridiem to `"9:05am"`.
fn clock_time(time: &str, meridiem: Meridiem) -> Option<String> {
    let time = time.trim();
    if time.is_empty() {
        return None;
    }
    let (hour, minute) = match time.split_once(':') {
        Some((hour, minute)) => (hour.trim(), minute.trim()),
        None => (time, ""),
    };
    let hour: u8 = hour.parse().ok().filter(|h| (1..=12).contains(h))?;
    let minute = minute
        .parse::<u8>()
        .ok()
        .filter(|m| *m <= 59)
        .unwrap_or(0);
    Some(format!(
        "{hour}:{minute:02}{}",
        meridiem.to_string().to_lowercase()
    ))
}

/// Converts candidate hours into the stored shape, `None` when no day converts.
pub fn to_opening_hours(hours: &WeeklyHours) -> Option<OpeningHours> {
    let converted: OpeningHours = Weekday::ALL
        .into_iter()
        .map(|day| (day, hours.get(&day).and_then(DayHours::to_range_string)))
        .collect();
    converted
        .values()
        .any(Option::is_some)
        .then_some(converted)
}

/// Reads stored hours of whatever shape a row holds.
///
/// Day keys match any casing of the full or short label, unknown keys are dropped, and a
/// day value may be a range string or a split [`DayHours`]. Free text is read as weekday
/// descriptions separated by newlines, commas or semicolons. `None` when nothing places.
pub fn read_hours(value: &Value) -> Option<OpeningHours> {
    let hours: OpeningHours = match value {
        Value::Object(days) => days
            .iter()
            .filter_map(|(key, range)| Some((Weekday::from_label(key)?, read_range(range))))
            .collect(),
        Value::String(text) => text
            .split(['\n', ',', ';'])
            .filter_map(|line| match parse_day_description(line) {
                DayParse::Open(day, hours) => Some((day, hours.to_range_string())),
                DayParse::Closed(day) => Some((day, None)),
                DayParse::Unparsable => None,
            })
            .collect(),
        _ => OpeningHours::new(),
    };
    if hours.is_empty() {
        if !value.is_null() {
            debug!("ignoring unreadable hours {value}");
        }
        return None;
    }
    Some(hours)
}

fn read_range(value: &Value) -> Option<String> {
    match value {
        Value::String(range) => Some(range.trim())
            .filter(|range| !range.is_empty())
            .map(str::to_string),
        Value::Object(_) => DayHours::deserialize(value).ok()?.to_range_string(),
        _ => None,
    }
}

/// `deserialize_with` for hours fields that must never fail their parent.
pub fn lenient_hours<'de, D>(deserializer: D) -> Result<Option<OpeningHours>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(read_hours(&value))
}

/// `"Mon: 9:00am-5:00pm, Tue: ..."` for popups and list rows.
pub fn summarize(hours: &OpeningHours) -> String {
    let days: Vec<String> = hours
        .iter()
        .filter_map(|(day, range)| {
            let range = range.as_deref()?.trim();
            (!range.is_empty()).then(|| format!("{}: {}", day.short_label(), range))
        })
        .collect();
    if days.is_empty() {
        String::from("Hours not specified")
    } else {
        days.join(", ")
    }
}
