use crate::output::print_json;
use anyhow::Context;
use phonebook_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    io::ensure_dir(&paths::storage_dir(root)).context("failed to create .phonebook/")?;

    let created = Config::init_default(root).context("failed to write config")?;

    if json {
        return print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "config_created": created,
        }));
    }

    println!("Initialized phone book in {}", paths::phonebook_dir(root).display());
    if !created {
        println!("Kept existing {}", paths::CONFIG_FILE);
    }
    Ok(())
}
