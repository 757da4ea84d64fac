use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A value transfer. `sender == None` marks coin creation (mining rewards).
///
/// Nothing here is checked: amounts may be negative or exceed the sender's
/// balance, and there is no signature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: Option<String>,
    pub recipient: String,
    pub amount: f64,
}

impl Transaction {
    pub fn transfer(sender: impl Into<String>, recipient: impl Into<String>, amount: f64) -> Self {
        Self {
            sender: Some(sender.into()),
            recipient: recipient.into(),
            amount,
        }
    }

    /// Coin-creation credit with no sender.
    pub fn reward(recipient: impl Into<String>, amount: f64) -> Self {
        Self {
            sender: None,
            recipient: recipient.into(),
            amount,
        }
    }

    pub fn is_reward(&self) -> bool {
        self.sender.is_none()
    }

    pub(crate) fn to_canonical_json(&self) -> Value {
        json!({
            "sender": self.sender,
            "recipient": self.recipient,
            "amount": canonical_amount(self.amount),
        })
    }
}

/// JSON has no NaN or infinities and would render all three as `null`, so
/// non-finite amounts are committed by name instead.
fn canonical_amount(amount: f64) -> Value {
    if amount.is_finite() {
        Value::from(amount)
    } else {
        Value::String(format!("{amount:?}"))
    }
}
