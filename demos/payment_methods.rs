//! Decoding a vault of payment methods keyed by arbitrary ids.
//!
//! Run with: cargo run --example payment_methods

use serde::{Deserialize, Serialize};
use serde_keyed::{decode_keyed, encode_keyed, KeyMap, KeyOptions, Keyed, Result};
use std::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
enum PaymentMethod {
    Card { brand: String, last4: String },
    Wallet { provider: String },
}

#[derive(Debug, Default, Clone)]
struct Account {
    owner: String,
    methods: Vec<PaymentMethod>,
    auto_topup: Option<u32>,
    recent_charges: Vec<u64>,
}

const AUTO_TOPUP: &str = "vault.autoTopup";

impl Keyed for Account {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.field(&mut self.owner, "account.owner")?;

        if map.is_decoding() {
            for key in map.all_keys("vault")? {
                if key == AUTO_TOPUP {
                    continue;
                }
                let mut method = None;
                if map.optional(&mut method, &key).is_ok() {
                    self.methods.extend(method);
                }
            }
        } else {
            for (index, method) in self.methods.iter_mut().enumerate() {
                map.field(method, &format!("vault.{}", index))?;
            }
        }
        map.optional(&mut self.auto_topup, AUTO_TOPUP)?;

        map.array_with(
            &mut self.recent_charges,
            "history.* charges",
            &KeyOptions::legacy(),
        )
    }
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let json = r#"{
        "account": { "owner": "Alice" },
        "vault": {
            "pm_1": { "type": "card", "brand": "visa", "last4": "4242" },
            "pm_2": { "type": "crypto", "coin": "doge" },
            "pm_3": { "type": "wallet", "provider": "paypal" },
            "autoTopup": 25
        },
        "history": { "charges": [1200, "refunded", 450, -3] }
    }"#;

    let account: Account = decode_keyed(json)?;
    println!("Owner: {}", account.owner);
    for method in &account.methods {
        println!("  {:?}", method);
    }
    println!("Auto top-up: {:?}", account.auto_topup);
    println!("Charges kept: {:?}", account.recent_charges);
    assert_eq!(account.methods.len(), 2);
    assert_eq!(account.recent_charges, vec![1200, 450]);

    let encoded = encode_keyed(&account)?;
    println!("\nRe-encoded:\n{}", encoded);

    Ok(())
}
