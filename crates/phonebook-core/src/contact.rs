use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// One phone book entry. Only `id` and `name` are required; `age` is derived
/// from `birthday` and is never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Contact {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    /// "First Last" when both split fields are set, otherwise `name`.
    pub fn display_name(&self) -> String {
        match (non_blank(&self.first_name), non_blank(&self.last_name)) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            _ => self.name.clone(),
        }
    }

    /// The dedicated last-name field when present, else the final
    /// whitespace-delimited token of `name`.
    pub fn surname(&self) -> &str {
        match non_blank(&self.last_name) {
            Some(last) => last,
            None => self.name.split_whitespace().last().unwrap_or(""),
        }
    }

    /// Lowercased [`Contact::surname`] with accents stripped, so "Ávila"
    /// keys as "avila".
    pub fn last_name_key(&self) -> String {
        fold_accents(self.surname()).to_lowercase()
    }

    pub fn birth_date(&self) -> BirthDate {
        self.birthday
            .as_deref()
            .map(BirthDate::from_iso)
            .unwrap_or_default()
    }

    pub fn recompute_age(&mut self, today: NaiveDate) {
        self.age = calculate_age(&self.birth_date(), today);
    }

    /// Overlay every non-blank field of `incoming` onto `self`. Blank or
    /// missing fields keep their previous value. The age is recomputed only
    /// when the birthday changed. Returns true if anything changed.
    pub fn merge_from(&mut self, incoming: &Contact, today: NaiveDate) -> bool {
        let before = self.clone();

        if !incoming.name.trim().is_empty() {
            self.name = incoming.name.trim().to_string();
        }
        overlay(&mut self.first_name, &incoming.first_name);
        overlay(&mut self.last_name, &incoming.last_name);
        overlay(&mut self.birthday, &incoming.birthday);
        overlay(&mut self.photo, &incoming.photo);
        overlay(&mut self.street_address, &incoming.street_address);
        overlay(&mut self.city, &incoming.city);
        overlay(&mut self.state, &incoming.state);
        overlay(&mut self.zip_code, &incoming.zip_code);
        overlay(&mut self.phone_number, &incoming.phone_number);
        overlay(&mut self.email, &incoming.email);

        if self.birthday != before.birthday {
            self.recompute_age(today);
        }
        *self != before
    }
}

fn overlay(target: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = non_blank(incoming) {
        *target = Some(value.to_string());
    }
}

/// Canonical decomposition with combining marks removed.
fn fold_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// BirthDate
// ---------------------------------------------------------------------------

/// A birthdate as the form supplies it: three independent strings, any of
/// which may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BirthDate {
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
}

impl BirthDate {
    pub fn new(year: &str, month: &str, day: &str) -> Self {
        Self {
            year: Some(year.to_string()),
            month: Some(month.to_string()),
            day: Some(day.to_string()),
        }
    }

    /// Split `YYYY-MM-DD` into its parts without validating them.
    pub fn from_iso(iso: &str) -> Self {
        let mut parts = iso.trim().splitn(3, '-').map(|p| p.to_string());
        Self {
            year: parts.next().filter(|p| !p.is_empty()),
            month: parts.next().filter(|p| !p.is_empty()),
            day: parts.next().filter(|p| !p.is_empty()),
        }
    }

    /// All three parts present and non-blank.
    pub fn is_complete(&self) -> bool {
        non_blank(&self.year).is_some()
            && non_blank(&self.month).is_some()
            && non_blank(&self.day).is_some()
    }

    /// The raw parts joined with '-', for echoing back malformed input.
    pub fn raw(&self) -> String {
        format!(
            "{}-{}-{}",
            self.year.as_deref().unwrap_or(""),
            self.month.as_deref().unwrap_or(""),
            self.day.as_deref().unwrap_or("")
        )
    }

    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        let year = non_blank(&self.year)?.parse::<i32>().ok()?;
        let month = non_blank(&self.month)?.parse::<u32>().ok()?;
        let day = non_blank(&self.day)?.parse::<u32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// Zero-padded `YYYY-MM-DD`, or `None` if the parts are not a real date.
    pub fn to_iso(&self) -> Option<String> {
        self.to_naive_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
    }
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

/// Completed years between `birth` and `today`, one less if this year's
/// birthday has not happened yet. `None` when a part is missing, the parts
/// are not a calendar date, or the date lies in the future.
pub fn calculate_age(birth: &BirthDate, today: NaiveDate) -> Option<u32> {
    let born = birth.to_naive_date()?;
    if born > today {
        return None;
    }
    let mut age = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

/// Locale-style comparator on last names. Base letters decide first, ignoring
/// case and accents; on a tie the unaccented form sorts before the accented
/// one, then lowercase before uppercase. Names equal at every level compare
/// equal, so callers need a stable sort to keep insertion order.
pub fn sort_by_last_name(a: &Contact, b: &Contact) -> Ordering {
    a.last_name_key()
        .cmp(&b.last_name_key())
        .then_with(|| accent_key(a.surname()).cmp(&accent_key(b.surname())))
        .then_with(|| case_key(a.surname()).cmp(&case_key(b.surname())))
}

/// Per-letter accent weights: 0 for a bare letter, 1 for an accented one.
fn accent_key(name: &str) -> Vec<u8> {
    name.nfc()
        .map(|c| {
            let marked = c.to_string().nfd().any(is_combining_mark);
            u8::from(marked)
        })
        .collect()
}

/// Per-letter case weights: lowercase sorts first.
fn case_key(name: &str) -> Vec<u8> {
    fold_accents(name)
        .chars()
        .map(|c| u8::from(c.is_uppercase()))
        .collect()
}

/// Stable in-place sort by last name.
pub fn sort_contacts(contacts: &mut [Contact]) {
    contacts.sort_by(sort_by_last_name);
}

/// `max(id) + 1`, or 1 for an empty list.
pub fn next_id(contacts: &[Contact]) -> i64 {
    contacts.iter().map(|c| c.id).max().map_or(1, |max| max + 1)
}

pub fn has_unique_ids(contacts: &[Contact]) -> bool {
    let mut seen = HashSet::with_capacity(contacts.len());
    contacts.iter().all(|c| seen.insert(c.id))
}

// ---------------------------------------------------------------------------
// Seed list
// ---------------------------------------------------------------------------

struct SeedEntry {
    id: i64,
    name: &'static str,
    photo: &'static str,
    birthday: &'static str,
    street_address: &'static str,
    city: &'static str,
    zip_code: &'static str,
}

const SEED: [SeedEntry; 6] = [
    SeedEntry {
        id: 1,
        name: "Jessica Christian",
        photo: "Unsplash Jessica Christian.png",
        birthday: "2022-05-30",
        street_address: "1234 Main St",
        city: "San Francisco",
        zip_code: "94111",
    },
    SeedEntry {
        id: 2,
        name: "Lia Bekyan",
        photo: "Unsplash Lia Bekyan.png",
        birthday: "2010-09-24",
        street_address: "1234 Happy Lane",
        city: "San Diego",
        zip_code: "91911",
    },
    SeedEntry {
        id: 3,
        name: "Remy Loz",
        photo: "Unsplash Remy Loz.png",
        birthday: "2000-07-04",
        street_address: "1234 Main St",
        city: "San Francisco",
        zip_code: "94111",
    },
    SeedEntry {
        id: 4,
        name: "Ryan Hoffman",
        photo: "Unsplash Ryan Hoffman.png",
        birthday: "1990-04-06",
        street_address: "1234 Main St",
        city: "San Francisco",
        zip_code: "94111",
    },
    SeedEntry {
        id: 5,
        name: "Tadas Petrokas",
        photo: "Unsplash Tadas Petrokas.png",
        birthday: "1956-08-07",
        street_address: "1234 Main St",
        city: "San Francisco",
        zip_code: "94111",
    },
    SeedEntry {
        id: 6,
        name: "Yohan Marion",
        photo: "Unsplash Yohan Marion.png",
        birthday: "1890-11-24",
        street_address: "1234 Main St",
        city: "San Francisco",
        zip_code: "94111",
    },
];

/// The canonical demo list restored on RESET, with ages computed against
/// `today` and sorted by last name.
pub fn seed_contacts(today: NaiveDate) -> Vec<Contact> {
    let mut contacts: Vec<Contact> = SEED
        .iter()
        .map(|s| {
            let mut contact = Contact {
                id: s.id,
                name: s.name.to_string(),
                birthday: Some(s.birthday.to_string()),
                photo: Some(s.photo.to_string()),
                street_address: Some(s.street_address.to_string()),
                city: Some(s.city.to_string()),
                state: Some("CA".to_string()),
                zip_code: Some(s.zip_code.to_string()),
                phone_number: Some("555-555-5555".to_string()),
                email: Some(format!("{}@fakeEmail.com", s.name.replace(' ', "."))),
                ..Default::default()
            };
            contact.recompute_age(today);
            contact
        })
        .collect();
    sort_contacts(&mut contacts);
    contacts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn june_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn age_counts_birthday_today_as_passed() {
        assert_eq!(calculate_age(&BirthDate::new("1990", "06", "01"), june_first()), Some(34));
    }

    #[test]
    fn age_before_birthday_is_one_less() {
        assert_eq!(calculate_age(&BirthDate::new("1990", "06", "02"), june_first()), Some(33));
        assert_eq!(calculate_age(&BirthDate::new("1990", "12", "31"), june_first()), Some(33));
    }

    #[test]
    fn age_missing_or_invalid_parts() {
        let missing_day = BirthDate {
            year: Some("1990".into()),
            month: Some("06".into()),
            day: None,
        };
        assert_eq!(calculate_age(&missing_day, june_first()), None);
        assert_eq!(calculate_age(&BirthDate::new("1990", "02", "30"), june_first()), None);
        assert_eq!(calculate_age(&BirthDate::new("abcd", "02", "01"), june_first()), None);
        assert_eq!(calculate_age(&BirthDate::default(), june_first()), None);
    }

    #[test]
    fn age_future_birthdate_is_none() {
        assert_eq!(calculate_age(&BirthDate::new("2030", "01", "01"), june_first()), None);
    }

    #[test]
    fn age_leap_day_birthday() {
        let today = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        assert_eq!(calculate_age(&BirthDate::new("2000", "02", "29"), today), Some(23));
        let eve = NaiveDate::from_ymd_opt(2023, 2, 28).unwrap();
        assert_eq!(calculate_age(&BirthDate::new("2000", "02", "29"), eve), Some(22));
    }

    #[test]
    fn birth_date_from_iso_splits_parts() {
        let b = BirthDate::from_iso("1920-03-15");
        assert_eq!(b, BirthDate::new("1920", "03", "15"));
        assert!(!BirthDate::from_iso("1920").is_complete());
        assert_eq!(BirthDate::new("1920", "3", "5").to_iso().as_deref(), Some("1920-03-05"));
    }

    #[test]
    fn last_name_uses_final_token_or_dedicated_field() {
        let combined = Contact::new(1, "Mary Ann  Smith");
        assert_eq!(combined.last_name_key(), "smith");

        let split = Contact {
            last_name: Some("De la Cruz".into()),
            ..Contact::new(2, "Juan De la Cruz")
        };
        assert_eq!(split.last_name_key(), "de la cruz");
    }

    #[test]
    fn sort_is_case_insensitive_and_stable() {
        let mut contacts = vec![
            Contact::new(1, "Zed adams"),
            Contact::new(2, "Amy Baker"),
            Contact::new(3, "Bob Adams"),
            Contact::new(4, "Cy adams"),
        ];
        sort_contacts(&mut contacts);
        let ids: Vec<i64> = contacts.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 4, 3, 2]);
    }

    #[test]
    fn accented_last_names_sort_with_their_base_letter() {
        let mut contacts = vec![
            Contact::new(1, "Zoe Baker"),
            Contact::new(2, "Ana Ávila"),
            Contact::new(3, "Li Zhang"),
            Contact::new(4, "Eve Éclair"),
            Contact::new(5, "Tom Eastwood"),
        ];
        sort_contacts(&mut contacts);
        let names: Vec<&str> = contacts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Ana Ávila", "Zoe Baker", "Tom Eastwood", "Eve Éclair", "Li Zhang"]
        );
    }

    #[test]
    fn unaccented_name_precedes_accented_twin() {
        let plain = Contact::new(1, "A Cote");
        let accented = Contact::new(2, "B Côte");
        assert_eq!(plain.last_name_key(), accented.last_name_key());
        assert_eq!(sort_by_last_name(&accented, &plain), Ordering::Greater);
        assert_eq!(sort_by_last_name(&plain, &plain.clone()), Ordering::Equal);
    }

    #[test]
    fn next_id_is_max_plus_one() {
        assert_eq!(next_id(&[]), 1);
        let contacts = vec![Contact::new(7, "A B"), Contact::new(3, "C D")];
        assert_eq!(next_id(&contacts), 8);
    }

    #[test]
    fn unique_id_check() {
        assert!(has_unique_ids(&[Contact::new(1, "a"), Contact::new(2, "b")]));
        assert!(!has_unique_ids(&[Contact::new(1, "a"), Contact::new(1, "b")]));
    }

    #[test]
    fn merge_keeps_previous_value_for_blank_fields() {
        let mut existing = Contact {
            phone_number: Some("555-0100".into()),
            city: Some("Austin".into()),
            ..Contact::new(1, "Ada Lovelace")
        };
        let incoming = Contact {
            phone_number: Some("".into()),
            city: Some("Boston".into()),
            ..Contact::new(1, "  ")
        };
        assert!(existing.merge_from(&incoming, june_first()));
        assert_eq!(existing.name, "Ada Lovelace");
        assert_eq!(existing.phone_number.as_deref(), Some("555-0100"));
        assert_eq!(existing.city.as_deref(), Some("Boston"));
    }

    #[test]
    fn merge_recomputes_age_only_when_birthday_changes() {
        let mut existing = Contact {
            birthday: Some("1990-06-01".into()),
            age: Some(99),
            ..Contact::new(1, "Ada Lovelace")
        };
        existing.merge_from(&Contact::new(1, "Ada King"), june_first());
        assert_eq!(existing.age, Some(99));

        let incoming = Contact {
            birthday: Some("2000-06-02".into()),
            ..Contact::default()
        };
        existing.merge_from(&incoming, june_first());
        assert_eq!(existing.age, Some(23));
    }

    #[test]
    fn seed_is_sorted_with_computed_ages() {
        let seed = seed_contacts(june_first());
        assert_eq!(seed.len(), 6);
        let names: Vec<String> = seed.iter().map(|c| c.last_name_key()).collect();
        assert_eq!(
            names,
            vec!["bekyan", "christian", "hoffman", "loz", "marion", "petrokas"]
        );
        let hoffman = seed.iter().find(|c| c.id == 4).unwrap();
        assert_eq!(hoffman.age, Some(34));
        assert!(has_unique_ids(&seed));
        assert_eq!(
            hoffman.email.as_deref(),
            Some("Ryan.Hoffman@fakeEmail.com")
        );
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let contact = Contact {
            phone_number: Some("555".into()),
            zip_code: Some("94111".into()),
            ..Contact::new(1, "Ada Lovelace")
        };
        let json = serde_json::to_string(&contact).unwrap();
        assert!(json.contains("\"phoneNumber\":\"555\""));
        assert!(json.contains("\"zipCode\":\"94111\""));
        assert!(!json.contains("email"));
    }
}
