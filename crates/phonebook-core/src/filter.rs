use crate::contact::Contact;
use crate::types::FilterMode;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Age ranges
// ---------------------------------------------------------------------------

/// A closed age interval offered as a quick filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeRange {
    pub label: &'static str,
    pub range_bottom: u32,
    pub range_top: u32,
}

impl AgeRange {
    /// The `N-M` filter text that selects this range.
    pub fn filter_text(&self) -> String {
        format!("{}-{}", self.range_bottom, self.range_top)
    }
}

pub static AGE_RANGES: [AgeRange; 5] = [
    AgeRange { label: "Babies", range_bottom: 0, range_top: 2 },
    AgeRange { label: "Children", range_bottom: 3, range_top: 16 },
    AgeRange { label: "Young Adults", range_bottom: 17, range_top: 29 },
    AgeRange { label: "Middle Aged Adults", range_bottom: 30, range_top: 59 },
    AgeRange { label: "Seniors", range_bottom: 60, range_top: 200 },
];

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgeFilter {
    AtLeast(i64),
    AtMost(i64),
    Above(i64),
    Below(i64),
    Between(i64, i64),
    OneOf(Vec<String>),
    Exactly(i64),
}

impl AgeFilter {
    /// Parse in priority order: `>=`/`<=`, then `>`/`<`, then `N-M`, then
    /// `N,M,K`, then `N`/`=N`. `None` when the numbers do not parse.
    pub fn parse(text: &str) -> Option<AgeFilter> {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix(">=") {
            return parse_int(rest).map(AgeFilter::AtLeast);
        }
        if let Some(rest) = text.strip_prefix("<=") {
            return parse_int(rest).map(AgeFilter::AtMost);
        }
        if let Some(rest) = text.strip_prefix('>') {
            return parse_int(rest).map(AgeFilter::Above);
        }
        if let Some(rest) = text.strip_prefix('<') {
            return parse_int(rest).map(AgeFilter::Below);
        }
        if let Some((min, max)) = text.split_once('-') {
            return Some(AgeFilter::Between(parse_int(min)?, parse_int(max)?));
        }
        if text.contains(',') {
            let ages = text.split(',').map(|a| a.trim().to_string()).collect();
            return Some(AgeFilter::OneOf(ages));
        }
        let exact = text.strip_prefix('=').unwrap_or(text);
        parse_int(exact).map(AgeFilter::Exactly)
    }

    pub fn matches_age(&self, age: u32) -> bool {
        let n = i64::from(age);
        match self {
            AgeFilter::AtLeast(x) => n >= *x,
            AgeFilter::AtMost(x) => n <= *x,
            AgeFilter::Above(x) => n > *x,
            AgeFilter::Below(x) => n < *x,
            AgeFilter::Between(lo, hi) => n >= *lo && n <= *hi,
            AgeFilter::OneOf(ages) => {
                let age = age.to_string();
                ages.iter().any(|a| *a == age)
            }
            AgeFilter::Exactly(x) => n == *x,
        }
    }
}

fn parse_int(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

/// A parsed filter expression. Parsing never fails: malformed input becomes
/// [`Filter::Nothing`].
#[derive(Debug, Clone)]
pub enum Filter {
    All,
    Name(Regex),
    Age(AgeFilter),
    Nothing,
}

impl Filter {
    pub fn parse(text: &str, mode: FilterMode) -> Filter {
        if text.trim().is_empty() {
            return Filter::All;
        }
        match mode {
            FilterMode::Name => name_pattern(text).map_or(Filter::Nothing, Filter::Name),
            FilterMode::Age => match AgeFilter::parse(text) {
                Some(age) => Filter::Age(age),
                None => {
                    tracing::debug!(filter = %text, "unparseable age filter matches nothing");
                    Filter::Nothing
                }
            },
        }
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        match self {
            Filter::All => true,
            Filter::Name(re) => re.is_match(&contact.display_name()),
            Filter::Age(age_filter) => contact.age.is_some_and(|age| age_filter.matches_age(age)),
            Filter::Nothing => false,
        }
    }

    pub fn apply<'a>(&self, contacts: &'a [Contact]) -> Vec<&'a Contact> {
        contacts.iter().filter(|c| self.matches(c)).collect()
    }
}

/// Case-insensitive pattern; text that is not a valid regex is matched
/// literally instead.
fn name_pattern(text: &str) -> Option<Regex> {
    RegexBuilder::new(text)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(text))
                .case_insensitive(true)
                .build()
        })
        .ok()
}

/// One-shot form of [`Filter::parse`] + [`Filter::matches`].
pub fn matches_filter(contact: &Contact, filter_text: &str, mode: FilterMode) -> bool {
    Filter::parse(filter_text, mode).matches(contact)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
