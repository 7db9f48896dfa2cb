//! Letter-bucketed contact storage.
//!
//! Contacts live in the bucket of the lowercased first letter of their name,
//! in insertion order. A bucket is removed as soon as it becomes empty, so
//! every key present in the map has at least one contact.

use std::collections::{BTreeMap, HashSet};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use thiserror::Error;

use crate::contact::{Contact, ContactId, IdGenerator, Letter};
use crate::search;
use crate::validate::{self, Field, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Contact with the same name and phone already exists")]
    DuplicateContact,
    #[error("No contact with id {id} under letter {}", .letter.upper())]
    NotFound { letter: Letter, id: ContactId },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContactStore {
    buckets: BTreeMap<Letter, Vec<Contact>>,
}

impl ContactStore {
    /// Build a store from raw buckets, such as ones read back from disk.
    /// Empty buckets are dropped. Invalid fields, a contact filed under the
    /// wrong letter or an id used twice reject the whole input.
    ///
    /// Repeated name and phone pairs are accepted: edits may create them.
    pub fn from_buckets(mut buckets: BTreeMap<Letter, Vec<Contact>>) -> Result<Self> {
        buckets.retain(|_, bucket| !bucket.is_empty());

        let mut seen = HashSet::new();
        for (letter, bucket) in &buckets {
            for contact in bucket {
                validate::validate(&contact.name, &contact.job, &contact.phone)
                    .with_context(|| format!("contact {} is invalid", contact.id))?;
                if Letter::of_name(contact.name.trim()) != Some(*letter) {
                    bail!(
                        "contact {} ({}) is filed under {}",
                        contact.id,
                        contact.name,
                        letter.upper()
                    );
                }
                if !seen.insert(&contact.id) {
                    bail!("contact id {} is used more than once", contact.id);
                }
            }
        }

        Ok(Self { buckets })
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, letter: Letter) -> &[Contact] {
        self.buckets.get(&letter).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn get(&self, letter: Letter, id: &ContactId) -> Option<&Contact> {
        self.bucket(letter).iter().find(|contact| &contact.id == id)
    }

    pub fn letter_counts(&self) -> impl Iterator<Item = (Letter, usize)> + '_ {
        self.buckets.iter().map(|(letter, bucket)| (*letter, bucket.len()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &ContactId> {
        self.buckets.values().flatten().map(|contact| &contact.id)
    }

    /// Whether a contact with this name (ignoring case) and exactly this
    /// phone exists in any bucket. Inputs are compared as given; callers
    /// trim them first.
    pub fn is_duplicate(&self, name: &str, phone: &str) -> bool {
        let name = name.to_lowercase();
        self.buckets
            .values()
            .flatten()
            .any(|contact| contact.name.to_lowercase() == name && contact.phone == phone)
    }

    pub fn add(
        &mut self,
        name: &str,
        job: &str,
        phone: &str,
        ids: &mut IdGenerator,
    ) -> Result<Contact, StoreError> {
        let (name, job, phone) = (name.trim(), job.trim(), phone.trim());
        let letter = checked_letter(name, job, phone)?;

        if self.is_duplicate(name, phone) {
            return Err(StoreError::DuplicateContact);
        }

        let contact = Contact {
            id: ids.next_id(),
            name: name.to_string(),
            job: job.to_string(),
            phone: phone.to_string(),
        };
        self.buckets.entry(letter).or_default().push(contact.clone());

        tracing::debug!("added contact {} under {}", contact.id, letter);
        Ok(contact)
    }

    /// Remove a contact. Unknown letters or ids leave the store untouched.
    pub fn delete(&mut self, letter: Letter, id: &ContactId) -> Option<Contact> {
        let removed = self.take(letter, id);
        if removed.is_none() {
            tracing::debug!("no contact {} under {}; nothing deleted", id, letter);
        }
        removed
    }

    /// Replace the fields of an existing contact, keeping its id. The
    /// contact moves to another bucket when its first letter changes.
    ///
    /// Unlike [`ContactStore::add`], no duplicate check is made here.
    pub fn edit(
        &mut self,
        letter: Letter,
        id: &ContactId,
        name: &str,
        job: &str,
        phone: &str,
    ) -> Result<Contact, StoreError> {
        let (name, job, phone) = (name.trim(), job.trim(), phone.trim());
        let new_letter = checked_letter(name, job, phone)?;

        let previous = self.take(letter, id).ok_or_else(|| StoreError::NotFound {
            letter,
            id: id.clone(),
        })?;

        let contact = Contact {
            id: previous.id,
            name: name.to_string(),
            job: job.to_string(),
            phone: phone.to_string(),
        };
        self.buckets.entry(new_letter).or_default().push(contact.clone());

        tracing::debug!("edited contact {} ({} -> {})", contact.id, letter, new_letter);
        Ok(contact)
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Every contact in letter order, then insertion order within a bucket.
    pub fn list_all(&self) -> impl Iterator<Item = (Letter, &Contact)> {
        self.buckets
            .iter()
            .flat_map(|(letter, bucket)| bucket.iter().map(move |contact| (*letter, contact)))
    }

    /// Contacts whose name starts with the query, ignoring case. A blank
    /// query matches nothing.
    pub fn search(&self, query: &str) -> impl Iterator<Item = (Letter, &Contact)> {
        search::normalize_query(query).into_iter().flat_map(move |query| {
            self.list_all()
                .filter(move |(_, contact)| search::name_matches(&contact.name, &query))
        })
    }

    fn take(&mut self, letter: Letter, id: &ContactId) -> Option<Contact> {
        let bucket = self.buckets.get_mut(&letter)?;
        let index = bucket.iter().position(|contact| &contact.id == id)?;
        let contact = bucket.remove(index);
        if bucket.is_empty() {
            self.buckets.remove(&letter);
        }
        Some(contact)
    }
}

/// Validate already trimmed fields and return the bucket for the name.
fn checked_letter(name: &str, job: &str, phone: &str) -> Result<Letter, ValidationError> {
    validate::validate(name, job, phone)?;
    Letter::of_name(name).ok_or(ValidationError::InvalidNameOrJob(Field::Name))
}
