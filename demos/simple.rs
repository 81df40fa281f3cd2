//! Loading, dumping and serde round trips of a save file.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use serde_lpc::{dump, from_str, load, to_string, Value};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Player {
    name: String,
    level: u32,
    gold: f64,
    titles: Vec<String>,
}

const SAVE: &str = "#3:2\nname \"simple\"\nfraction 2.2\nnumber 123\narr ({1,2,3,})\n";

fn main() -> Result<(), Box<dyn Error>> {
    // Load a save file into a document
    let doc = load(SAVE)?;
    for (name, value) in &doc {
        println!("{} = {:?}", name, value);
    }
    assert_eq!(doc.get("number").and_then(Value::as_i64), Some(123));

    // Canonical text comes back unchanged
    let text = dump(&doc)?;
    assert_eq!(text, SAVE);
    println!("\n✓ Load/dump round-trip successful\n");

    // Typed access through serde
    let player = Player {
        name: "Alice".to_string(),
        level: 7,
        gold: 12.5,
        titles: vec!["the brave".to_string(), "dragon slayer".to_string()],
    };

    let text = to_string(&player)?;
    println!("Save file output:\n{}", text);

    let player_back: Player = from_str(&text)?;
    assert_eq!(player, player_back);
    println!("✓ Serde round-trip successful");

    Ok(())
}
