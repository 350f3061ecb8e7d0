use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config;

// ---------------------------------------------------------------------------
// CardId — Card identifiers arrive as integers or strings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardId {
    Int(i64),
    Str(String),
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardId::Int(id) => write!(f, "{id}"),
            CardId::Str(id) => f.write_str(id),
        }
    }
}

// ---------------------------------------------------------------------------
// DeckSummary — Normalized deck record
// ---------------------------------------------------------------------------

/// Normalized deck summary.
///
/// Every field is always serialized, including `sub_class_id` when it is
/// `None`. Field order matches the upstream deck detail payload. Mappings use
/// `BTreeMap` so identical input always serializes to identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckSummary {
    pub total_red_ether: u64,
    pub num_follower: u32,
    pub num_spell: u32,
    pub num_amulet: u32,
    /// Cost bucket (`"2"`, `"3"`, ...) to number of cards.
    pub mana_curve: BTreeMap<String, u32>,
    pub battle_format: i64,
    pub class_id: i64,
    pub sub_class_id: Option<i64>,
    /// Card ids in the deck's display order.
    pub sort_card_id_list: Vec<CardId>,
    /// Card id to copy count.
    pub deck_card_num: BTreeMap<String, u32>,
}

impl Default for DeckSummary {
    fn default() -> Self {
        Self {
            total_red_ether: 0,
            num_follower: 0,
            num_spell: 0,
            num_amulet: 0,
            mana_curve: BTreeMap::new(),
            battle_format: config::DEFAULT_BATTLE_FORMAT,
            class_id: config::DEFAULT_CLASS_ID,
            sub_class_id: None,
            sort_card_id_list: Vec::new(),
            deck_card_num: BTreeMap::new(),
        }
    }
}

impl DeckSummary {
    /// Total number of cards in the deck, summed from `deck_card_num`.
    pub fn card_count(&self) -> u32 {
        self.deck_card_num.values().sum()
    }
}
