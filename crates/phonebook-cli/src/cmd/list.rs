use crate::output::{print_json, print_table};
use crate::session::Session;
use chrono::NaiveDate;
use phonebook_core::{
    birthday::transform_iso_birthday,
    contact::Contact,
    filter::Filter,
    machine::Snapshot,
    types::FilterMode,
    PhonebookError,
};
use std::path::Path;

pub fn run(
    root: &Path,
    today: NaiveDate,
    filter_text: &str,
    mode: FilterMode,
    json: bool,
) -> anyhow::Result<()> {
    let session = Session::open(root, today)?;
    let filter = Filter::parse(filter_text, mode);
    let matched: Vec<Contact> = filter
        .apply(session.machine.contacts())
        .into_iter()
        .cloned()
        .collect();

    if json {
        return print_json(&Snapshot {
            state: session.machine.state(),
            contacts: matched,
        });
    }

    if matched.is_empty() {
        if filter_text.is_empty() {
            println!("No contacts. Run: phonebook create --name <NAME> --phone <PHONE>");
        } else {
            println!("No contacts match '{filter_text}'.");
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = matched
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.display_name(),
                c.age.map(|a| a.to_string()).unwrap_or_default(),
                c.birthday.as_deref().map(transform_iso_birthday).unwrap_or_default(),
                c.phone_number.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "AGE", "BIRTHDAY", "PHONE"], rows);
    Ok(())
}

pub fn show(root: &Path, today: NaiveDate, id: i64, json: bool) -> anyhow::Result<()> {
    let session = Session::open(root, today)?;
    let contact = session
        .machine
        .find(id)
        .ok_or(PhonebookError::ContactNotFound(id))?;

    if json {
        return print_json(contact);
    }

    println!("Contact {}: {}", contact.id, contact.display_name());
    let birthday = contact
        .birthday
        .as_deref()
        .map(transform_iso_birthday)
        .unwrap_or_default();
    let address = [
        contact.street_address.as_deref(),
        contact.city.as_deref(),
        contact.state.as_deref(),
        contact.zip_code.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");

    for (label, value) in [
        ("Birthday", birthday),
        ("Age", contact.age.map(|a| a.to_string()).unwrap_or_default()),
        ("Phone", contact.phone_number.clone().unwrap_or_default()),
        ("Email", contact.email.clone().unwrap_or_default()),
        ("Address", address),
        ("Photo", contact.photo.clone().unwrap_or_default()),
    ] {
        if !value.is_empty() {
            println!("  {label:<9}{value}");
        }
    }
    Ok(())
}
