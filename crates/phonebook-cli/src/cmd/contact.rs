use crate::output::print_json;
use crate::session::Session;
use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use phonebook_core::{
    dialog::{ContactForm, Dialog},
    machine::{Effect, Event, Transition},
    types::DialogMode,
    webhook, PhonebookError,
};
use std::path::Path;

/// Contact dialog fields. Anything left out counts as untouched.
#[derive(Args, Debug)]
pub struct FormArgs {
    /// Full name
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long = "phone")]
    phone_number: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    birth_year: Option<String>,
    #[arg(long)]
    birth_month: Option<String>,
    #[arg(long)]
    birth_day: Option<String>,
    #[arg(long)]
    photo: Option<String>,
    #[arg(long = "street")]
    street_address: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long = "zip")]
    zip_code: Option<String>,
    /// Only checked when extended_create is on; never stored
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    security_question: Option<String>,
    #[arg(long = "security-answer")]
    security_question_answer: Option<String>,
}

impl From<FormArgs> for ContactForm {
    fn from(a: FormArgs) -> Self {
        ContactForm {
            name: a.name,
            first_name: a.first_name,
            last_name: a.last_name,
            birth_year: a.birth_year,
            birth_month: a.birth_month,
            birth_day: a.birth_day,
            photo: a.photo,
            street_address: a.street_address,
            city: a.city,
            state: a.state,
            zip_code: a.zip_code,
            phone_number: a.phone_number,
            email: a.email,
            password: a.password,
            security_question: a.security_question,
            security_question_answer: a.security_question_answer,
        }
    }
}

pub fn create(root: &Path, today: NaiveDate, form: FormArgs, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(root, today)?;
    let mut dialog = Dialog::open(DialogMode::Create, None);
    *dialog.form_mut() = form.into();
    submit(&mut session, dialog, json)
}

pub fn update(
    root: &Path,
    today: NaiveDate,
    id: i64,
    form: FormArgs,
    json: bool,
) -> anyhow::Result<()> {
    let mut session = Session::open(root, today)?;
    let previous = session
        .machine
        .find(id)
        .cloned()
        .ok_or(PhonebookError::ContactNotFound(id))?;
    let mut dialog = Dialog::open(DialogMode::Update, Some(previous));
    *dialog.form_mut() = form.into();
    submit(&mut session, dialog, json)
}

pub fn delete(root: &Path, today: NaiveDate, id: i64, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(root, today)?;
    let previous = session
        .machine
        .find(id)
        .cloned()
        .ok_or(PhonebookError::ContactNotFound(id))?;
    submit(&mut session, Dialog::open(DialogMode::Delete, Some(previous)), json)
}

pub fn reset(root: &Path, today: NaiveDate, json: bool) -> anyhow::Result<()> {
    let mut session = Session::open(root, today)?;
    submit(&mut session, Dialog::open(DialogMode::Reset, None), json)
}

/// Submit the dialog, flush with FINISH, then fire the webhook for creates
/// and updates that reached storage. The webhook result is reported but never
/// changes the outcome.
fn submit(session: &mut Session, mut dialog: Dialog, json: bool) -> anyhow::Result<()> {
    let rules = session.create_rules();
    let mut transitions: Vec<Transition> = dialog
        .submit(&mut session.machine, rules)
        .context("contact not saved")?
        .into_iter()
        .collect();
    transitions.extend(session.machine.send(Event::Finish));

    let notify = transitions.iter().find_map(|t| match &t.effect {
        Effect::Created { id } | Effect::Updated { id } => session.machine.find(*id).cloned(),
        _ => None,
    });

    if json {
        print_json(&transitions)?;
    } else {
        for t in &transitions {
            report(session, t);
        }
    }

    for t in &transitions {
        match &t.effect {
            Effect::Rejected { reason } => anyhow::bail!("contact not saved: {reason}"),
            Effect::PersistFailed { reason } => {
                anyhow::bail!("changes were not saved to storage: {reason}")
            }
            _ => {}
        }
    }

    if let (Some(url), Some(contact)) = (session.config.usable_webhook(), notify) {
        let timeout = session.config.webhook_timeout();
        match webhook::spawn_post(url.to_string(), contact, timeout).join() {
            Ok(Ok(_)) => eprintln!("webhook: delivered to {url}"),
            Ok(Err(e)) => eprintln!("webhook: {e}"),
            Err(_) => eprintln!("webhook: sender thread panicked"),
        }
    }
    Ok(())
}

fn report(session: &Session, t: &Transition) {
    let name_of = |id: i64| {
        session
            .machine
            .find(id)
            .map(|c| c.display_name())
            .unwrap_or_default()
    };
    match &t.effect {
        Effect::Created { id } => println!("Created contact {id}: {}", name_of(*id)),
        Effect::Updated { id } => println!("Updated contact {id}: {}", name_of(*id)),
        Effect::Unchanged { id } => println!("Contact {id} unchanged"),
        Effect::Deleted { id } => println!("Deleted contact {id}"),
        Effect::Missing { id } => println!("No contact {id}; nothing changed"),
        Effect::Reset { count } => println!("Reset phone book to {count} demo contacts"),
        Effect::Persisted { .. } | Effect::Loaded { .. } => {}
        Effect::Rejected { .. } | Effect::PersistFailed { .. } => {}
    }
}
