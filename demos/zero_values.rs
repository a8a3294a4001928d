//! Building placeholder instances of keyed types, and the key graph that
//! lists every path they read.
//!
//! Run with: cargo run --example zero_values

use chrono::NaiveDate;
use serde_keyed::{
    build_graph, encode_keyed, impl_keyed_serde, zero, zero_with, IsoDate, KeyMap, Keyed,
    KeyedConfig, Result, ZeroMode,
};
use std::error::Error;

#[derive(Debug, Default, Clone)]
struct Address {
    street: String,
    city: String,
}

impl Keyed for Address {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.field(&mut self.street, "lines.street")?;
        map.field(&mut self.city, "city")
    }
}

impl_keyed_serde!(Address);

#[derive(Debug, Default, Clone)]
struct Customer {
    name: String,
    address: Address,
    born: Option<NaiveDate>,
    phones: Vec<String>,
    loyalty_points: Option<u32>,
}

impl Keyed for Customer {
    fn map(&mut self, map: &mut KeyMap<'_>) -> Result<()> {
        map.field(&mut self.name, "customer.name")?;
        map.field(&mut self.address, "customer.address")?;
        map.transformed_optional::<IsoDate>(&mut self.born, "customer.born")?;
        map.array(&mut self.phones, "contact.phones")?;
        map.optional(&mut self.loyalty_points, "loyalty.points")
    }
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let minimum: Customer = zero()?;
    println!("Minimum zero:\n{:#?}", minimum);
    println!("Encoded: {}\n", encode_keyed(&minimum)?);

    let populated: Customer = zero_with(ZeroMode::Populated, KeyedConfig::global())?;
    println!("Populated zero:\n{:#?}", populated);
    println!("Encoded: {}", encode_keyed(&populated)?);

    assert_eq!(minimum.loyalty_points, None);
    assert_eq!(populated.loyalty_points, Some(0));
    assert_eq!(populated.phones, vec![String::new()]);

    let query = build_graph::<Customer>()?.updating(&[], "query customer");
    println!("\nKey graph:\n{}", query);

    Ok(())
}
