//! Drink catalog — named menus of named drinks, loaded from `Menu.json`.
//!
//! ```json
//! { "Menu": [
//!     { "MenuName": "Classics",
//!       "Bottles": "1 Vodka, 2 Gin, ...",
//!       "Drink": [ { "Name": "Gin Tonic", "Recipe": [0, 15, 0, 0, 0, 45, 0, 0] } ] }
//! ] }
//! ```
//!
//! Recipe entries are tenths of a unit, one per pump. `Bottles` is a
//! label for the operator and never affects a pour. Recipes are checked
//! against the rig's channel count when looked up, not at load time, so
//! one malformed drink does not take the whole menu down.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::recipe::Recipe;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrinkEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Recipe")]
    pub recipe: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    #[serde(rename = "MenuName")]
    pub name: String,
    #[serde(rename = "Bottles", default)]
    pub bottles: String,
    #[serde(rename = "Drink", default)]
    pub drinks: Vec<DrinkEntry>,
}

impl Menu {
    /// First drink named `name`.
    pub fn drink(&self, name: &str) -> Option<&DrinkEntry> {
        self.drinks.iter().find(|d| d.name == name)
    }

    pub fn drink_names(&self) -> impl Iterator<Item = &str> {
        self.drinks.iter().map(|d| d.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "Menu")]
    menus: Vec<Menu>,
}

impl Catalog {
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(text).map_err(|_| CatalogError::Malformed)?;
        if catalog.menus.is_empty() {
            return Err(CatalogError::Empty);
        }
        log::info!(
            "Catalog: {} menus, {} drinks",
            catalog.menus.len(),
            catalog.menus.iter().map(|m| m.drinks.len()).sum::<usize>()
        );
        Ok(catalog)
    }

    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    pub fn menu(&self, index: usize) -> Result<&Menu, CatalogError> {
        self.menus.get(index).ok_or(CatalogError::NoSuchMenu(index))
    }

    /// Look up `drink` in menu `index` and validate its recipe for a rig
    /// with `channel_count` pumps.
    pub fn recipe(&self, index: usize, drink: &str, channel_count: u8) -> Result<Recipe, CatalogError> {
        let entry = self.menu(index)?.drink(drink).ok_or(CatalogError::NoSuchDrink)?;
        Ok(Recipe::new(&entry.recipe, channel_count)?)
    }
}
