use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::model::{common::party::PartyCore, mongodb::Id};

/// A party without an ID, ready to be inserted.
pub type NewParty = PartyCore;

/// A party from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub party: PartyCore,
}

impl Deref for Party {
    type Target = PartyCore;

    fn deref(&self) -> &Self::Target {
        &self.party
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mongodb::bson::{doc, from_document, to_document};

    #[test]
    fn id_stored_as_object_id() {
        let party = Party {
            id: Id::new(),
            party: NewParty::example(),
        };
        let doc = to_document(&party).unwrap();
        assert_eq!(doc.get_object_id("_id").unwrap(), *party.id);
        assert_eq!(doc.get_str("name").unwrap(), party.name);
        assert_eq!(from_document::<Party>(doc).unwrap(), party);
    }

    #[test]
    fn sparse_document_loads() {
        let id = Id::new();
        let party: Party = from_document(doc! { "_id": id, "name": "bare" }).unwrap();
        assert_eq!(party.id, id);
        assert_eq!(party.name, "bare");
        assert!(party.ballots.is_empty());
        assert_eq!(party.config.nvotes, 0);
    }
}
