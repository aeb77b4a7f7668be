use serde::{Deserialize, Serialize};

use crate::model::common::{ballot::Ballot, note::Note, receipt::Receipt};

/// How votes in a party are counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    /// Name of the distribution strategy.
    pub strategy: String,
    /// Votes each participant may allocate.
    pub nvotes: i32,
}

/// A signature over the party contents, supplied by the creator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignedEnvelope {
    pub message: String,
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer: Option<String>,
}

/// Core party data, without the store-assigned ID.
///
/// Missing fields deserialize to their zero value so that partially-filled
/// clients can still create parties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyCore {
    pub name: String,
    pub description: String,
    pub config: VotingConfig,
    pub candidates: Vec<String>,
    pub participants: Vec<String>,
    pub ballots: Vec<Ballot>,
    pub receipts: Vec<Receipt>,
    pub notes: Vec<Note>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed: Option<SignedEnvelope>,
}
