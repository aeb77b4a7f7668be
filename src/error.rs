use log::{error, warn};
use mongodb::{
    bson::{oid::Error as OidError, ser::Error as BsonSerError},
    error::Error as DbError,
};
use rocket::{
    http::{Status, StatusClass},
    response::{self, Responder, Response},
    Request,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Bson(#[from] BsonSerError),
    #[error("Invalid identifier: {0}")]
    InvalidId(#[from] OidError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn bad_request(why: impl Into<String>) -> Self {
        Self::BadRequest(why.into())
    }

    /// The HTTP status this error is reported as.
    pub fn status(&self) -> Status {
        match self {
            Self::Db(_) | Self::Bson(_) => Status::InternalServerError,
            Self::InvalidId(_) | Self::BadRequest(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::Status(status, _) => *status,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        let message = self.to_string();
        match status.class() {
            StatusClass::ServerError => error!("{}: {message}", req.uri()),
            _ => warn!("{}: {message}", req.uri()),
        }
        Response::build_from(message.respond_to(req)?)
            .status(status)
            .ok()
    }
}
