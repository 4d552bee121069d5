use std::fmt;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Bucket a transaction is accounted under.
///
/// `1..=12` are calendar months, [`MonthKey::UNKNOWN`] collects dates whose month
/// segment could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(u8);

impl MonthKey {
    pub const UNKNOWN: MonthKey = MonthKey(0);

    /// Returns key for given month number, anything outside `1..=12` is [`MonthKey::UNKNOWN`]
    pub fn new(month: i64) -> Self {
        match u8::try_from(month) {
            Ok(m @ 1..=12) => MonthKey(m),
            _ => Self::UNKNOWN,
        }
    }

    /// Parses leading `M` segment of `M/D/YYYY` date
    pub fn from_date(date: &str) -> Self {
        date.split('/')
            .next()
            .and_then(|segment| segment.parse::<i64>().ok())
            .map(Self::new)
            .unwrap_or(Self::UNKNOWN)
    }

    pub fn is_known(&self) -> bool {
        *self != Self::UNKNOWN
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    pub fn name(&self) -> &'static str {
        match self.number() {
            m @ 1..=12 => MONTH_NAMES[usize::from(m - 1)],
            _ => "Unknown",
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
