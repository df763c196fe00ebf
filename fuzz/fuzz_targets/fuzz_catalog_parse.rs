//! Fuzz target: `Catalog::from_json` and recipe lookup
//!
//! Feeds arbitrary documents into the menu parser. Whatever parses must
//! survive a lookup of every drink it lists, and every recipe that
//! validates must have exactly one non-negative entry per pump.
//!
//! cargo fuzz run fuzz_catalog_parse

#![no_main]

use barbot::catalog::Catalog;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(catalog) = Catalog::from_json(text) else {
        return;
    };
    assert!(!catalog.is_empty(), "parsed catalog must have a menu");

    for (index, menu) in catalog.menus().iter().enumerate() {
        for name in menu.drink_names() {
            if let Ok(recipe) = catalog.recipe(index, name, 8) {
                assert_eq!(recipe.len(), 8);
                assert!(recipe.quantities().iter().all(|q| *q >= 0.0));
            }
        }
    }
});
