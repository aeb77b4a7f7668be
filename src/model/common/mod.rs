pub mod ballot;
pub mod note;
pub mod party;
pub mod receipt;
