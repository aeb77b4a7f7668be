use std::fmt;

use mongodb::bson::{Bson, Document};
use serde::{
    de::{self, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};

/// A payout transaction made to a participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Receipt {
    /// Receiving account.
    pub account: String,
    pub amount: Amount,
    /// Token contract the payout was made in.
    pub token: String,
    /// Transaction hash.
    pub txn: String,
    /// Distribution strategy that produced the payout.
    pub strategy: String,
    #[serde(rename = "chainId", skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<i64>,
}

/// An arbitrary-precision amount.
///
/// Clients send these in whatever shape their big-number library produces
/// (decimal strings, plain numbers or `{ "type": "BigNumber", "hex": ... }`
/// objects), so the value is kept verbatim rather than interpreted.
///
/// Integers that fit an `i64` are stored as `Int64`. Wider numbers (wei
/// values routinely exceed 2^63) are stored as their exact decimal text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Amount(pub Bson);

/// Map key serde_json uses to hand over the raw text of a number it could
/// not fit into a primitive (`arbitrary_precision` feature).
const RAW_NUMBER_TOKEN: &str = "$serde_json::private::Number";

impl Amount {
    fn from_number_text(text: &str) -> Self {
        if let Ok(int) = text.parse::<i64>() {
            return Self(Bson::Int64(int));
        }
        // Keep floats as doubles only when nothing is lost in the conversion.
        match text.parse::<f64>() {
            Ok(float) if float.is_finite() && float.to_string() == text => Self(Bson::Double(float)),
            _ => Self(Bson::String(text.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, a decimal string or a big-number object")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Amount, E> {
        Ok(Amount(Bson::Boolean(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount(Bson::Int64(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(match i64::try_from(v) {
            Ok(int) => Amount(Bson::Int64(int)),
            Err(_) => Amount(Bson::String(v.to_string())),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        Ok(Amount(Bson::Double(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Ok(Amount(Bson::String(v.to_string())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Amount, E> {
        Ok(Amount(Bson::String(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount(Bson::Null))
    }

    fn visit_none<E: de::Error>(self) -> Result<Amount, E> {
        Ok(Amount(Bson::Null))
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        Amount::deserialize(deserializer)
    }

    fn visit_seq<A>(self, seq: A) -> Result<Amount, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        Bson::deserialize(de::value::SeqAccessDeserializer::new(seq)).map(Amount)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Amount, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut doc = Document::new();
        while let Some(key) = map.next_key::<String>()? {
            if key == RAW_NUMBER_TOKEN && doc.is_empty() {
                let text: String = map.next_value()?;
                return Ok(Amount::from_number_text(&text));
            }
            let value: Bson = map.next_value()?;
            doc.insert(key, value);
        }
        Ok(Amount(Bson::Document(doc)))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use mongodb::bson::{from_bson, to_bson};
    use rocket::serde::json::serde_json;

    #[test]
    fn amount_kept_verbatim() {
        let receipt: Receipt = serde_json::from_str(
            r#"{"account":"0x1","amount":"123456789012345678901234567890","chainId":137}"#,
        )
        .unwrap();
        assert_eq!(
            receipt.amount,
            Amount(Bson::String("123456789012345678901234567890".to_string()))
        );
        assert_eq!(receipt.chain_id, Some(137));

        let receipt: Receipt = serde_json::from_str(r#"{"amount":42}"#).unwrap();
        assert_eq!(receipt.amount, Amount(Bson::Int64(42)));
        assert_eq!(serde_json::to_value(&receipt).unwrap()["amount"], 42);

        let receipt: Receipt = serde_json::from_str(r#"{"amount":-7}"#).unwrap();
        assert_eq!(receipt.amount, Amount(Bson::Int64(-7)));
    }

    #[test]
    fn wide_integers_keep_every_digit() {
        // 10 ETH in wei: above i64::MAX, below u64::MAX.
        let receipt: Receipt = serde_json::from_str(r#"{"amount":10000000000000000000}"#).unwrap();
        assert_eq!(
            receipt.amount,
            Amount(Bson::String("10000000000000000000".to_string()))
        );

        // Above u64::MAX.
        let receipt: Receipt = serde_json::from_str(r#"{"amount":1500000000000000000000}"#).unwrap();
        assert_eq!(
            receipt.amount,
            Amount(Bson::String("1500000000000000000000".to_string()))
        );

        let receipt: Receipt =
            serde_json::from_str(r#"{"amount":-99999999999999999999999}"#).unwrap();
        assert_eq!(
            receipt.amount,
            Amount(Bson::String("-99999999999999999999999".to_string()))
        );
    }

    #[test]
    fn fractional_amounts() {
        let receipt: Receipt = serde_json::from_str(r#"{"amount":0.5}"#).unwrap();
        assert_eq!(receipt.amount, Amount(Bson::Double(0.5)));

        let receipt: Receipt =
            serde_json::from_str(r#"{"amount":1.000000000000000000001}"#).unwrap();
        assert_eq!(
            receipt.amount,
            Amount(Bson::String("1.000000000000000000001".to_string()))
        );
    }

    #[test]
    fn wide_amount_survives_storage() {
        let receipt: Receipt = serde_json::from_str(
            r#"{"account":"0x1","amount":10000000000000000000,"token":"ETH"}"#,
        )
        .unwrap();
        let loaded: Receipt = from_bson(to_bson(&receipt).unwrap()).unwrap();
        assert_eq!(loaded, receipt);
        assert_eq!(
            serde_json::to_value(&loaded).unwrap()["amount"],
            "10000000000000000000"
        );
    }

    #[test]
    fn wide_amount_inside_flattened_party() {
        use crate::model::api::party::PartyDescription;

        let body = format!(
            r#"{{"id":"{}","name":"p","receipts":[{{"amount":10000000000000000000}}]}}"#,
            crate::model::mongodb::Id::new()
        );
        let party: PartyDescription = serde_json::from_str(&body).unwrap();
        assert_eq!(
            party.party.receipts[0].amount,
            Amount(Bson::String("10000000000000000000".to_string()))
        );
    }

    #[test]
    fn big_number_object_survives_storage() {
        let stored = to_bson(&Receipt::example2()).unwrap();
        let loaded: Receipt = from_bson(stored).unwrap();
        assert_eq!(loaded, Receipt::example2());
        let json = serde_json::to_value(&loaded).unwrap();
        assert_eq!(json["amount"]["hex"], "0x0de0b6b3a7640000");
        assert!(json.get("chainId").is_none());
    }
}
