use anyhow::Context;
use chrono::NaiveDate;
use phonebook_core::{
    config::Config,
    dialog::CreateRules,
    machine::{Event, PhoneBookMachine},
    paths,
    storage::FileStorage,
};
use std::path::Path;

/// One command's worth of phone book: the config and the single machine
/// instance every event goes through, already READ.
pub struct Session {
    pub config: Config,
    pub machine: PhoneBookMachine<FileStorage>,
}

impl Session {
    pub fn open(root: &Path, today: NaiveDate) -> anyhow::Result<Self> {
        paths::ensure_initialized(root)?;
        let config = Config::load(root).context("failed to load config")?;
        paths::validate_key(&config.storage_key).context("invalid storage_key in config")?;

        let mut machine = PhoneBookMachine::new(FileStorage::for_root(root))
            .with_storage_key(config.storage_key.clone())
            .with_today(today);
        machine.send(Event::Read);
        tracing::debug!(
            root = %root.display(),
            key = %config.storage_key,
            contacts = machine.contacts().len(),
            "phone book opened"
        );

        Ok(Self { config, machine })
    }

    pub fn create_rules(&self) -> CreateRules {
        if self.config.extended_create {
            CreateRules::Extended
        } else {
            CreateRules::Basic
        }
    }
}
