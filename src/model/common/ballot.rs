use serde::{Deserialize, Serialize};

/// A signed vote cast in a party.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ballot {
    /// Signature over `data`, produced by the voter's wallet.
    pub signature: String,
    pub data: VoteData,
}

/// The signed part of a ballot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteData {
    /// Reference to the party this vote is for.
    pub party: String,
    pub ballot: VotePayload,
    /// Client-side timestamp, milliseconds since the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotePayload {
    /// Address of the voter.
    pub address: String,
    /// Encoded vote allocation across candidates.
    pub votes: String,
}
