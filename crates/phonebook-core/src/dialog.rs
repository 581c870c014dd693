//! Turns a submitted contact dialog into exactly one machine event.
//!
//! Field-level validation belongs to whoever renders the form; the helpers
//! here exist so every front-end applies the same rules before calling
//! [`reduce`]. Whatever happens, a submitted dialog ends up closed with its
//! form cleared.

use crate::contact::{self, non_blank, BirthDate, Contact};
use crate::error::{PhonebookError, Result};
use crate::machine::{Event, PhoneBookMachine, Transition};
use crate::storage::Storage;
use crate::types::DialogMode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Id used when an UPDATE arrives without the contact it was opened for.
/// Never a valid id, so the machine treats it as unknown.
pub const UNSET_ID: i64 = -1;

/// Accepted password symbols.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*";

pub const SECURITY_QUESTIONS: [&str; 7] = [
    "What was the name of the boy or the girl you first kissed?",
    "Where were you when you had your first kiss?",
    "In what city did you meet your spouse/significant other?",
    "What is the middle name of your youngest child?",
    "What was the name of your first stuffed animal?",
    "In what city or town did your mother and father meet?",
    "What was the first exam you failed?",
];

// ---------------------------------------------------------------------------
// ContactForm
// ---------------------------------------------------------------------------

/// Raw dialog input. `None` and blank strings both mean "left untouched".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_year: Option<String>,
    pub birth_month: Option<String>,
    pub birth_day: Option<String>,
    pub photo: Option<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub security_question: Option<String>,
    pub security_question_answer: Option<String>,
}

impl ContactForm {
    pub fn birth_date(&self) -> BirthDate {
        BirthDate {
            year: self.birth_year.clone(),
            month: self.birth_month.clone(),
            day: self.birth_day.clone(),
        }
    }

    /// `name`, or "first last" when only the split fields were filled in.
    fn full_name(&self) -> Option<String> {
        if let Some(name) = non_blank(&self.name) {
            return Some(name.to_string());
        }
        match (non_blank(&self.first_name), non_blank(&self.last_name)) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            _ => None,
        }
    }

    fn has_birth_parts(&self) -> bool {
        [&self.birth_year, &self.birth_month, &self.birth_day]
            .into_iter()
            .any(|part| non_blank(part).is_some())
    }

    /// Birth parts overlaid one by one on `previous`'s birthday.
    fn merged_birth_date(&self, previous: Option<&Contact>) -> BirthDate {
        let base = previous.map(Contact::birth_date).unwrap_or_default();
        BirthDate {
            year: pick(&self.birth_year, Some(&base.year)),
            month: pick(&self.birth_month, Some(&base.month)),
            day: pick(&self.birth_day, Some(&base.day)),
        }
    }

    /// The full name after applying this form to `previous`. An explicit
    /// `name` wins; otherwise a changed first or last name is recombined with
    /// whichever half was kept.
    fn merged_name(&self, previous: Option<&Contact>) -> String {
        if let Some(name) = non_blank(&self.name) {
            return name.to_string();
        }
        let prev_name = previous.map_or("", |p| p.name.trim());
        let (new_first, new_last) = (non_blank(&self.first_name), non_blank(&self.last_name));
        if new_first.is_none() && new_last.is_none() {
            return prev_name.to_string();
        }
        let prev_first = previous
            .and_then(|p| non_blank(&p.first_name))
            .unwrap_or_else(|| {
                prev_name
                    .rsplit_once(char::is_whitespace)
                    .map_or("", |(first, _)| first.trim())
            });
        let prev_last = previous.map_or("", |p| p.surname());
        [new_first.unwrap_or(prev_first), new_last.unwrap_or(prev_last)]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Form value if present and non-blank, otherwise the previous value.
fn pick(form: &Option<String>, previous: Option<&Option<String>>) -> Option<String> {
    match non_blank(form) {
        Some(value) => Some(value.to_string()),
        None => previous.and_then(|p| p.clone()),
    }
}

fn owned(value: &Option<String>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

const INVALID_BIRTHDATE: &str = "Please enter a valid birthdate.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateRules {
    /// Name and phone number.
    #[default]
    Basic,
    /// Split name, phone, full birthdate, email, password and security
    /// question.
    Extended,
}

pub fn validate_password(password: &str) -> std::result::Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("Please enter a password of at least 8 characters.");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Please enter a password with at least one number.");
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err("Please enter a password with at least one symbol.");
    }
    Ok(())
}

/// Check the fields CREATE requires. Collects every failure.
pub fn validate_create(form: &ContactForm, rules: CreateRules) -> Result<()> {
    let mut errors = Vec::new();

    match rules {
        CreateRules::Basic => {
            if form.full_name().is_none() {
                errors.push("A name is required.".to_string());
            }
            if form.has_birth_parts() && form.birth_date().to_naive_date().is_none() {
                errors.push(INVALID_BIRTHDATE.to_string());
            }
        }
        CreateRules::Extended => {
            if non_blank(&form.first_name).is_none() || non_blank(&form.last_name).is_none() {
                errors.push("First and last name are required.".to_string());
            }
            let birth = form.birth_date();
            if !birth.is_complete() {
                errors.push("A full birthdate is required.".to_string());
            } else if birth.to_naive_date().is_none() {
                errors.push(INVALID_BIRTHDATE.to_string());
            }
            if !non_blank(&form.email).is_some_and(|e| e.contains('@')) {
                errors.push("Please enter a valid email address.".to_string());
            }
            if let Err(msg) = validate_password(form.password.as_deref().unwrap_or("")) {
                errors.push(msg.to_string());
            }
            if non_blank(&form.security_question).is_none() {
                errors.push("Please select a security question.".to_string());
            }
            if non_blank(&form.security_question_answer).is_none() {
                errors.push("Please answer the security question.".to_string());
            }
        }
    }

    if non_blank(&form.phone_number).is_none() {
        errors.push("A phone number is required.".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(PhonebookError::Validation(errors))
    }
}

/// Check an UPDATE form against the contact it edits. Birth parts are merged
/// with the stored birthday first, so a lone year is fine when the month and
/// day are already known.
pub fn validate_update(form: &ContactForm, previous: Option<&Contact>) -> Result<()> {
    if form.has_birth_parts() && form.merged_birth_date(previous).to_naive_date().is_none() {
        return Err(PhonebookError::Validation(vec![INVALID_BIRTHDATE.to_string()]));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------------

/// Normalize one dialog submission into a machine event.
///
/// - CREATE builds a new contact with id `max(existing) + 1` and a computed age.
/// - UPDATE overlays non-blank form fields on `previous`, birth parts one at
///   a time; its id always comes from `previous` ([`UNSET_ID`] if missing).
/// - DELETE passes `previous` through and ignores the form.
/// - RESET carries no payload. CLOSED produces nothing.
///
/// Password and security answers are validation-only and never reach the
/// contact.
pub fn reduce(
    form: &ContactForm,
    mode: DialogMode,
    previous: Option<&Contact>,
    existing: &[Contact],
    today: NaiveDate,
) -> Option<Event> {
    match mode {
        DialogMode::Create => Some(Event::Create(new_contact(form, existing, today))),
        DialogMode::Update => Some(Event::Update(merged_contact(form, previous, today))),
        DialogMode::Delete => previous.cloned().map(Event::Delete),
        DialogMode::Reset => Some(Event::Reset),
        DialogMode::Closed => None,
    }
}

fn new_contact(form: &ContactForm, existing: &[Contact], today: NaiveDate) -> Contact {
    let mut created = Contact {
        id: contact::next_id(existing),
        name: form.full_name().unwrap_or_default(),
        first_name: owned(&form.first_name),
        last_name: owned(&form.last_name),
        birthday: form.birth_date().to_iso(),
        age: None,
        photo: owned(&form.photo),
        street_address: owned(&form.street_address),
        city: owned(&form.city),
        state: owned(&form.state),
        zip_code: owned(&form.zip_code),
        phone_number: owned(&form.phone_number),
        email: owned(&form.email),
    };
    created.recompute_age(today);
    created
}

fn merged_contact(form: &ContactForm, previous: Option<&Contact>, today: NaiveDate) -> Contact {
    let birthday = form
        .merged_birth_date(previous)
        .to_iso()
        .or_else(|| previous.and_then(|p| p.birthday.clone()));
    let mut merged = Contact {
        id: previous.map_or(UNSET_ID, |p| p.id),
        name: form.merged_name(previous),
        first_name: pick(&form.first_name, previous.map(|p| &p.first_name)),
        last_name: pick(&form.last_name, previous.map(|p| &p.last_name)),
        birthday,
        age: previous.and_then(|p| p.age),
        photo: pick(&form.photo, previous.map(|p| &p.photo)),
        street_address: pick(&form.street_address, previous.map(|p| &p.street_address)),
        city: pick(&form.city, previous.map(|p| &p.city)),
        state: pick(&form.state, previous.map(|p| &p.state)),
        zip_code: pick(&form.zip_code, previous.map(|p| &p.zip_code)),
        phone_number: pick(&form.phone_number, previous.map(|p| &p.phone_number)),
        email: pick(&form.email, previous.map(|p| &p.email)),
    };
    if merged.birthday.is_some() {
        merged.recompute_age(today);
    }
    merged
}

// ---------------------------------------------------------------------------
// Dialog
// ---------------------------------------------------------------------------

/// Presentation-side dialog state: the mode it was opened in, the contact it
/// targets, and the form being edited.
#[derive(Debug, Clone, Default)]
pub struct Dialog {
    mode: Option<DialogMode>,
    contact: Option<Contact>,
    form: ContactForm,
}

impl Dialog {
    pub fn open(mode: DialogMode, contact: Option<Contact>) -> Self {
        Self {
            mode: Some(mode),
            contact,
            form: ContactForm::default(),
        }
    }

    pub fn mode(&self) -> DialogMode {
        self.mode.unwrap_or(DialogMode::Closed)
    }

    pub fn is_open(&self) -> bool {
        self.mode() != DialogMode::Closed
    }

    pub fn contact(&self) -> Option<&Contact> {
        self.contact.as_ref()
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ContactForm {
        &mut self.form
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    /// Validate (CREATE and UPDATE), reduce, and dispatch to `machine`. The
    /// dialog is closed and cleared on every path, including validation
    /// failure.
    pub fn submit<S: Storage>(
        &mut self,
        machine: &mut PhoneBookMachine<S>,
        rules: CreateRules,
    ) -> Result<Option<Transition>> {
        let mode = self.mode();
        let outcome = match mode {
            DialogMode::Create => validate_create(&self.form, rules),
            DialogMode::Update => validate_update(&self.form, self.contact.as_ref()),
            _ => Ok(()),
        }
        .map(|()| {
            reduce(
                &self.form,
                mode,
                self.contact.as_ref(),
                machine.contacts(),
                machine.today(),
            )
            .and_then(|event| machine.send(event))
        });
        self.close();
        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
