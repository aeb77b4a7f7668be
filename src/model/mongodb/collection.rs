use std::ops::Deref;

use mongodb::{Collection, Database};
use rocket::{
    http::Status,
    request::{self, FromRequest, Request},
};

/// The name of the collection holding parties, as configured at launch.
/// Lives in managed state next to the [`Database`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionName(pub String);

impl Deref for CollectionName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T> {
    /// Get a handle on the named collection in the given database.
    pub fn from_db(db: &Database, name: &str) -> Self {
        Self(db.collection(name))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T> {
    type Error = ();

    /// Get the database connection and collection name from the managed state
    /// and wrap them in a collection.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let rocket = req.rocket();
        match (rocket.state::<Database>(), rocket.state::<CollectionName>()) {
            (Some(db), Some(name)) => request::Outcome::Success(Coll::from_db(db, name)),
            _ => request::Outcome::Failure((Status::InternalServerError, ())),
        }
    }
}
