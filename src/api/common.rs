use mongodb::bson::{doc, to_bson, Document};
use rocket::serde::json::{Error as JsonError, Json};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{
    db::Party,
    mongodb::{Coll, Id},
};

/// A JSON request body, with the parse failure kept so it can be reported as
/// a bad request rather than Rocket's default unprocessable entity.
pub type JsonBody<'r, T> = std::result::Result<Json<T>, JsonError<'r>>;

/// Unwrap a JSON request body.
pub fn parse_body<T>(body: JsonBody<'_, T>) -> Result<T> {
    body.map(Json::into_inner)
        .map_err(|err| Error::bad_request(err.to_string()))
}

/// Append `item` to the array `field` of the party with the given ID.
pub async fn push_to_party<T: Serialize>(
    parties: &Coll<Party>,
    party_id: Id,
    field: &str,
    item: &T,
) -> Result<()> {
    let mut push = Document::new();
    push.insert(field, to_bson(item)?);
    let update = doc! { "$push": push };
    let result = parties.update_one(party_id.as_doc(), update, None).await?;
    if result.matched_count == 0 {
        Err(party_not_found(party_id))
    } else {
        Ok(())
    }
}

pub fn party_not_found(party_id: Id) -> Error {
    Error::not_found(format!("Party with ID '{party_id}'"))
}
