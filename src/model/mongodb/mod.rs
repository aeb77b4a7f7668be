mod bson;
mod collection;

pub use bson::Id;
pub use collection::{Coll, CollectionName};
