//! Typed commands issued against the contact book.

use anyhow::Result;

use crate::contact::{Contact, ContactId, IdGenerator, Letter};
use crate::storage::Persistence;
use crate::store::{ContactStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddContact {
        name: String,
        job: String,
        phone: String,
    },
    EditContact {
        letter: Letter,
        id: ContactId,
        name: String,
        job: String,
        phone: String,
    },
    DeleteContact {
        letter: Letter,
        id: ContactId,
    },
    ClearAll,
    Search {
        query: String,
    },
    ListAll,
}

impl Command {
    fn is_mutation(&self) -> bool {
        !matches!(self, Command::Search { .. } | Command::ListAll)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(Contact),
    Edited(Contact),
    Deleted(Option<Contact>),
    Cleared,
    Matches(Vec<(Letter, Contact)>),
}

impl Outcome {
    /// User-facing confirmation for mutating commands.
    pub fn message(&self) -> Option<String> {
        match self {
            Outcome::Added(contact) => {
                Some(format!("Contact {} successfully added!", contact.name))
            }
            Outcome::Edited(_) => Some("Contact successfully changed!".to_string()),
            Outcome::Deleted(Some(_)) => Some("Contact successfully deleted!".to_string()),
            Outcome::Deleted(None) => Some("Nothing to delete.".to_string()),
            Outcome::Cleared => Some("You have deleted all contacts!".to_string()),
            Outcome::Matches(_) => None,
        }
    }
}

/// Owner of the single authoritative contact store. Every successful
/// mutation is written through to the persistence backend.
pub struct Book<P: Persistence> {
    store: ContactStore,
    ids: IdGenerator,
    persistence: P,
}

impl<P: Persistence> Book<P> {
    pub fn open(persistence: P) -> Self {
        let store = persistence.load();
        let ids = IdGenerator::seeded(store.ids());
        Self {
            store,
            ids,
            persistence,
        }
    }

    pub fn store(&self) -> &ContactStore {
        &self.store
    }

    /// Run a command. Store errors come back as [`crate::store::StoreError`]
    /// wrapped in `anyhow::Error`; nothing is saved when a command fails.
    /// A mutation whose save fails is rolled back in memory as well.
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        tracing::debug!("executing {:?}", command);
        if !command.is_mutation() {
            return Ok(self.apply(command)?);
        }

        let snapshot = (self.store.clone(), self.ids.clone());
        let outcome = self.apply(command)?;
        if let Err(err) = self.persistence.save(&self.store) {
            (self.store, self.ids) = snapshot;
            return Err(err);
        }
        Ok(outcome)
    }

    fn apply(&mut self, command: Command) -> Result<Outcome, StoreError> {
        let outcome = match command {
            Command::AddContact { name, job, phone } => {
                Outcome::Added(self.store.add(&name, &job, &phone, &mut self.ids)?)
            }
            Command::EditContact {
                letter,
                id,
                name,
                job,
                phone,
            } => Outcome::Edited(self.store.edit(letter, &id, &name, &job, &phone)?),
            Command::DeleteContact { letter, id } => {
                Outcome::Deleted(self.store.delete(letter, &id))
            }
            Command::ClearAll => {
                self.store.clear();
                Outcome::Cleared
            }
            Command::Search { query } => Outcome::Matches(
                self.store
                    .search(&query)
                    .map(|(letter, contact)| (letter, contact.clone()))
                    .collect(),
            ),
            Command::ListAll => Outcome::Matches(
                self.store
                    .list_all()
                    .map(|(letter, contact)| (letter, contact.clone()))
                    .collect(),
            ),
        };
        Ok(outcome)
    }
}
