//! Working with Value and Document at runtime.
//!
//! Run with: cargo run --example dynamic_values

use serde_lpc::{dump, load, lpc, Document, Record, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Build values with the lpc! macro
    let inventory = lpc!({
        "sword": 1,
        "coins": [10, 20, 5],
        "weight": 3.5
    });

    let mut doc = Document::new();
    doc.insert("inventory", inventory);
    doc.insert(
        "home",
        Value::Struct(Record::new("room", vec![lpc!("/d/town/square"), lpc!(3)])),
    );
    doc.insert("on_death", Value::Closure("drop_all".to_string()));

    // Shared values go through an anchor and references to it
    doc.anchor(1, lpc!(["guild", "mages"]));
    doc.insert("membership", doc.reference(1));
    doc.insert("badge", doc.reference(1));

    println!("Document as save file:\n{}", dump(&doc)?);

    // Access values dynamically
    if let Some(mapping) = doc.get("inventory").and_then(Value::as_mapping) {
        if let Some(coins) = mapping.get_first(&lpc!("coins")).and_then(Value::as_array) {
            let total: i64 = coins.iter().filter_map(Value::as_i64).sum();
            println!("Coins: {} purses, {} total", coins.len(), total);
        }
    }

    if let Some(home) = doc.get("home").and_then(Value::as_struct) {
        println!("Home is a '{}' struct with {} fields", home.name(), home.len());
    }

    if let Some(membership) = doc.get("membership") {
        println!("Membership resolves to {:?}\n", doc.resolve(membership)?);
    }

    // References in loaded files resolve against their own document
    let loaded = load("#3:2\nowner <1>=({\"bob\",})\npet_owner <1>\n")?;
    if let (Some(owner), Some(pet_owner)) = (loaded.get("owner"), loaded.get("pet_owner")) {
        assert_eq!(owner.resolved()?, pet_owner.resolved()?);
        println!("pet_owner follows <1> to {:?}", pet_owner.resolved()?);
    }

    // Cycles load fine and are reported when followed
    let cyclic = load("#3:2\nnode <1>=(<\"node\",\"root\",<1>,>)\n")?;
    match dump(&cyclic) {
        Ok(_) => println!("unexpected success"),
        Err(err) => println!("Dumping a cycle fails: {}", err),
    }

    Ok(())
}
