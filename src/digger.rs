//! Field lookup over upstream deck responses whose nesting is not fixed.
//!
//! Some deployments return the deck fields at the root of the response,
//! others nest them one level down under a wrapper such as `data` or
//! `deckDetail`. [`Digger`] checks the root first and then each candidate
//! wrapper in order, and [`Digger::summarize`] repeats that lookup for every
//! [`DeckSummary`] field, substituting the field default when nothing usable
//! is found.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config;
use crate::models::DeckSummary;

/// Ordered first-match lookup across the root object and its wrapper keys.
#[derive(Debug, Clone)]
pub struct Digger {
    wrapper_keys: Vec<String>,
}

impl Default for Digger {
    fn default() -> Self {
        Self::new(config::CANDIDATE_WRAPPER_KEYS.iter().copied())
    }
}

impl Digger {
    /// Create a digger that tries `wrapper_keys` in the given order.
    pub fn new<I, S>(wrapper_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            wrapper_keys: wrapper_keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn wrapper_keys(&self) -> &[String] {
        &self.wrapper_keys
    }

    /// Find `field` on the root, or on the first wrapper object that has it.
    ///
    /// A key present on the root always wins, even when its value is `null`.
    /// Wrappers whose value is not an object are skipped.
    pub fn dig<'v>(&self, root: &'v Map<String, Value>, field: &str) -> Option<&'v Value> {
        if let Some(value) = root.get(field) {
            return Some(value);
        }
        self.wrapper_keys
            .iter()
            .filter_map(|key| root.get(key).and_then(Value::as_object))
            .find_map(|wrapper| wrapper.get(field))
    }

    /// Dig `field` and deserialize it as `T`.
    ///
    /// Returns `None` when the field is missing, `null`, or of the wrong type.
    pub fn field<T: DeserializeOwned>(&self, root: &Map<String, Value>, field: &str) -> Option<T> {
        match self.dig(root, field)? {
            Value::Null => None,
            value => match <T as Deserialize>::deserialize(value) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    log::warn!("ignoring upstream field '{field}' ({e}); using default");
                    None
                }
            },
        }
    }

    /// Build a complete [`DeckSummary`] from an upstream response object.
    pub fn summarize(&self, root: &Map<String, Value>) -> DeckSummary {
        let defaults = DeckSummary::default();
        DeckSummary {
            total_red_ether: self
                .field(root, "total_red_ether")
                .unwrap_or(defaults.total_red_ether),
            num_follower: self
                .field(root, "num_follower")
                .unwrap_or(defaults.num_follower),
            num_spell: self.field(root, "num_spell").unwrap_or(defaults.num_spell),
            num_amulet: self.field(root, "num_amulet").unwrap_or(defaults.num_amulet),
            mana_curve: self.field(root, "mana_curve").unwrap_or(defaults.mana_curve),
            battle_format: self
                .field(root, "battle_format")
                .unwrap_or(defaults.battle_format),
            class_id: self.field(root, "class_id").unwrap_or(defaults.class_id),
            sub_class_id: self
                .field(root, "sub_class_id")
                .or(defaults.sub_class_id),
            sort_card_id_list: self
                .field(root, "sort_card_id_list")
                .unwrap_or(defaults.sort_card_id_list),
            deck_card_num: self
                .field(root, "deck_card_num")
                .unwrap_or(defaults.deck_card_num),
        }
    }
}
