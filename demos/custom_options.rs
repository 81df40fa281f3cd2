//! Customizing load limits and dump formatting.
//!
//! Run with: cargo run --example custom_options

use serde_lpc::{
    dump, dump_with_options, load, load_with_options, DumpOptions, Error, LoadOptions, Separator,
};
use std::error::Error as StdError;

fn main() -> Result<(), Box<dyn StdError>> {
    let doc = load("#3:2\nname \"MyApp\"\nlevels ({1,2,3,})\n")?;

    // Default format (single space)
    println!("Default (space):");
    println!("{}", dump(&doc)?);

    // Tab separator between names and values
    println!("Tab separator:");
    let tab_options = DumpOptions::new().with_separator(Separator::Tab);
    let tab_format = dump_with_options(&doc, &tab_options)?;
    println!("{}", tab_format);
    assert_eq!(load(&tab_format)?, doc);

    // Nesting limit while loading
    let deep = format!("#3:2\nx {}1{}\n", "({".repeat(8), ",})".repeat(8));
    let strict = LoadOptions::new().with_max_depth(4);
    match load_with_options(&deep, &strict) {
        Err(Error::DepthLimit { limit, .. }) => {
            println!("Depth limit of {} rejected the nested array", limit)
        }
        other => println!("unexpected result: {:?}", other),
    }
    assert!(load_with_options(&deep, &LoadOptions::new()).is_ok());
    println!("Default limit of {} accepts it", LoadOptions::new().max_depth);

    // Syntax errors carry a position
    if let Err(err) = load("#3:2\nx ({1,2\n") {
        println!("\nSyntax error: {}", err);
    }

    Ok(())
}
