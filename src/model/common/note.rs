use serde::{Deserialize, Serialize};

/// A free-text annotation left on a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    /// The candidate the note is about.
    pub candidate: String,
    pub message: String,
    pub signature: String,
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Note {
        pub fn example() -> Self {
            Self {
                candidate: "0xB0B".to_string(),
                message: "Shipped the indexer two weeks early".to_string(),
                signature: "0x3c0ffee".to_string(),
            }
        }

        pub fn example2() -> Self {
            Self {
                candidate: "0xCAFE".to_string(),
                message: "Ran the community calls".to_string(),
                signature: "0xdecaf".to_string(),
            }
        }
    }
}
