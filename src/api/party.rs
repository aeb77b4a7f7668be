use mongodb::{
    bson::oid::Error as OidError,
    options::{FindOneAndUpdateOptions, ReturnDocument},
};
use rocket::{futures::TryStreamExt, http::Status, serde::json::Json, Route};

use crate::api::common::{parse_body, party_not_found, push_to_party, JsonBody};
use crate::error::{Error, Result};
use crate::model::{
    api::party::{PartyDescription, PartyUpdate},
    common::{ballot::Ballot, note::Note, receipt::Receipt},
    db::{NewParty, Party},
    mongodb::{Coll, Id},
};

pub fn routes() -> Vec<Route> {
    routes![
        get_parties,
        get_party,
        create_party,
        update_party,
        add_ballot,
        add_receipt,
        add_note,
        delete_party,
    ]
}

/// A party ID from the path. Parse failures are kept so they become a 400
/// rather than a forward to the 404 catcher.
type PartyId = std::result::Result<Id, OidError>;

#[get("/parties")]
async fn get_parties(parties: Coll<Party>) -> Result<Json<Vec<PartyDescription>>> {
    let parties = parties
        .find(None, None)
        .await?
        .map_ok(PartyDescription::from)
        .try_collect::<Vec<_>>()
        .await?;
    Ok(Json(parties))
}

#[get("/party/<party_id>")]
async fn get_party(party_id: PartyId, parties: Coll<Party>) -> Result<Json<PartyDescription>> {
    let party_id = party_id?;
    let party = parties
        .find_one(party_id.as_doc(), None)
        .await?
        .ok_or_else(|| party_not_found(party_id))?;
    Ok(Json(party.into()))
}

#[post("/party", data = "<party>")]
async fn create_party(
    party: JsonBody<'_, NewParty>,
    new_parties: Coll<NewParty>,
    parties: Coll<Party>,
) -> Result<Json<PartyDescription>> {
    // `NewParty` has no ID field, so any ID the client sent is already gone.
    let party = parse_body(party)?;
    let inserted_id = new_parties.insert_one(&party, None).await?.inserted_id;
    let party_id: Id = inserted_id
        .as_object_id()
        .ok_or_else(|| {
            Error::Status(
                Status::InternalServerError,
                format!("Store assigned a non-ObjectId ID: {inserted_id}"),
            )
        })?
        .into();

    // Retrieve the full party information including ID.
    let party = parties
        .find_one(party_id.as_doc(), None)
        .await?
        .ok_or_else(|| party_not_found(party_id))?;
    Ok(Json(party.into()))
}

#[put("/party/<party_id>", data = "<update>")]
async fn update_party(
    party_id: PartyId,
    update: JsonBody<'_, PartyUpdate>,
    parties: Coll<Party>,
) -> Result<Json<PartyDescription>> {
    let party_id = party_id?;
    let update = parse_body(update)?.to_update_doc()?;
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let party = parties
        .find_one_and_update(party_id.as_doc(), update, options)
        .await?
        .ok_or_else(|| party_not_found(party_id))?;
    Ok(Json(party.into()))
}

#[put("/party/<party_id>/vote", data = "<ballot>")]
async fn add_ballot(
    party_id: PartyId,
    ballot: JsonBody<'_, Ballot>,
    parties: Coll<Party>,
) -> Result<Json<Ballot>> {
    let party_id = party_id?;
    let ballot = parse_body(ballot)?;
    push_to_party(&parties, party_id, "ballots", &ballot).await?;
    Ok(Json(ballot))
}

#[put("/party/<party_id>/distribute", data = "<receipt>")]
async fn add_receipt(
    party_id: PartyId,
    receipt: JsonBody<'_, Receipt>,
    parties: Coll<Party>,
) -> Result<Json<Receipt>> {
    let party_id = party_id?;
    let receipt = parse_body(receipt)?;
    push_to_party(&parties, party_id, "receipts", &receipt).await?;
    Ok(Json(receipt))
}

#[put("/party/<party_id>/note", data = "<note>")]
async fn add_note(
    party_id: PartyId,
    note: JsonBody<'_, Note>,
    parties: Coll<Party>,
) -> Result<Json<Note>> {
    let party_id = party_id?;
    let note = parse_body(note)?;
    push_to_party(&parties, party_id, "notes", &note).await?;
    Ok(Json(note))
}

#[delete("/party/<party_id>")]
async fn delete_party(party_id: PartyId, parties: Coll<Party>) -> Result<Status> {
    let party_id = party_id?;
    let result = parties.delete_one(party_id.as_doc(), None).await?;
    if result.deleted_count == 0 {
        Err(party_not_found(party_id))
    } else {
        Ok(Status::NoContent)
    }
}
