use mongodb::bson::{doc, to_document, Document};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    api::id::ApiId,
    common::{
        ballot::Ballot,
        note::Note,
        party::{PartyCore, SignedEnvelope, VotingConfig},
        receipt::Receipt,
    },
    db::Party,
};

/// An API-friendly party: the stored document with its ID as a hex string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyDescription {
    pub id: ApiId,
    #[serde(flatten)]
    pub party: PartyCore,
}

impl From<Party> for PartyDescription {
    fn from(party: Party) -> Self {
        Self {
            id: party.id.into(),
            party: party.party,
        }
    }
}

/// A partial update to a party. Fields left out are not touched.
///
/// The ID is not updatable; array fields given here replace the stored array
/// wholesale. Appending goes through the dedicated endpoints instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<VotingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ballots: Option<Vec<Ballot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipts: Option<Vec<Receipt>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<Note>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed: Option<SignedEnvelope>,
}

impl PartyUpdate {
    /// Build the `$set` update for the fields present.
    ///
    /// Fails with a bad request if there is nothing to set, since the store
    /// rejects an empty `$set`.
    pub fn to_update_doc(&self) -> Result<Document> {
        let fields = to_document(self)?;
        if fields.is_empty() {
            return Err(Error::bad_request("no updatable fields in body"));
        }
        Ok(doc! { "$set": fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rocket::http::Status;
    use rocket::serde::json::serde_json;

    use crate::model::mongodb::Id;

    #[test]
    fn description_has_string_id() {
        let id = Id::new();
        let desc = PartyDescription::from(Party {
            id,
            party: PartyCore::example(),
        });
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["id"], id.to_hex());
        assert_eq!(json["name"], "Q2 contributor round");
        assert_eq!(json["config"]["strategy"], "quadratic");
        assert_eq!(json["signed"]["signer"], "0xA11CE");

        let round_trip: PartyDescription = serde_json::from_value(json).unwrap();
        assert_eq!(round_trip, desc);
    }

    #[test]
    fn update_sets_only_given_fields() {
        let update: PartyUpdate =
            serde_json::from_str(r#"{"name":"renamed","ballots":[],"id":"ignored"}"#).unwrap();
        let doc = update.to_update_doc().unwrap();
        let set = doc.get_document("$set").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get_str("name").unwrap(), "renamed");
        assert!(set.get_array("ballots").unwrap().is_empty());
    }

    #[test]
    fn empty_update_rejected() {
        let err = PartyUpdate::default().to_update_doc().unwrap_err();
        assert_eq!(err.status(), Status::BadRequest);

        let update: PartyUpdate = serde_json::from_str(r#"{"_id":"x","nonce":null}"#).unwrap();
        assert!(update.to_update_doc().is_err());
    }
}
