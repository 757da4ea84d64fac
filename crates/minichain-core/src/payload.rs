use serde_json::Value;

use crate::{constants::GENESIS_DATA, Transaction};

/// Content that can be committed into a block hash.
///
/// `canonical_bytes` must be a pure function of the value: two equal payloads
/// always encode to the same bytes, otherwise recomputed hashes would drift and
/// every chain would look tampered with.
pub trait Payload: Clone {
    fn canonical_bytes(&self) -> Vec<u8>;

    /// Sentinel payload stored in the genesis block.
    fn genesis() -> Self;
}

/// Free-form data. Objects serialize with sorted keys, so the compact JSON
/// rendering is canonical.
impl Payload for Value {
    fn canonical_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    fn genesis() -> Self {
        Value::String(GENESIS_DATA.to_string())
    }
}

impl Payload for Vec<Transaction> {
    fn canonical_bytes(&self) -> Vec<u8> {
        Value::Array(self.iter().map(Transaction::to_canonical_json).collect())
            .to_string()
            .into_bytes()
    }

    fn genesis() -> Self {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_keys_are_sorted() {
        let a = json!({ "b": 1, "a": 2 });
        assert_eq!(a.canonical_bytes(), br#"{"a":2,"b":1}"#.to_vec());
    }

    #[test]
    fn genesis_payloads() {
        assert_eq!(<Value as Payload>::genesis(), json!("GenesisBlock"));
        assert!(<Vec<Transaction> as Payload>::genesis().is_empty());
    }

    #[test]
    fn transaction_list_encoding_example() {
        let txs = vec![
            Transaction::reward("my-address", 12.5),
            Transaction::transfer("address1", "my-address", 10.0),
        ];
        let expected = r#"[{"amount":12.5,"recipient":"my-address","sender":null},{"amount":10.0,"recipient":"my-address","sender":"address1"}]"#;
        assert_eq!(String::from_utf8(txs.canonical_bytes()).unwrap(), expected);
    }

    #[test]
    fn transaction_order_matters() {
        let a = Transaction::transfer("A", "B", 1.0);
        let b = Transaction::transfer("B", "C", 2.0);
        let forward = vec![a.clone(), b.clone()];
        let reversed = vec![b, a];
        assert_ne!(forward.canonical_bytes(), reversed.canonical_bytes());
    }
}
