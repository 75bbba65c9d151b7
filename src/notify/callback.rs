//! Callback tokens attached to notification keyboards.
//!
//! The interpreter for these tokens lives in the conversational bot layer;
//! this subsystem only produces them. For selection actions the query is
//! exactly the petition's natural number, so the bot layer can resolve the
//! record it refers to.

use serde::{Deserialize, Serialize};

/// Action identifier carried by a callback token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallbackKey {
    #[serde(rename = "petition:selected")]
    PetitionSelected,
    #[serde(rename = "petition:unselected")]
    PetitionUnselected,
    #[serde(rename = "pagination:first")]
    PaginationFirst,
    #[serde(rename = "pagination:prev")]
    PaginationPrev,
    #[serde(rename = "pagination:current")]
    PaginationCurrent,
    #[serde(rename = "pagination:next")]
    PaginationNext,
    #[serde(rename = "pagination:last")]
    PaginationLast,
}

/// A compact `{key, query}` token, serialized as JSON into the callback
/// payload of a keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackToken {
    pub key: CallbackKey,
    pub query: String,
}

impl CallbackToken {
    /// Token for favoriting the given petition.
    pub fn select(number: &str) -> Self {
        Self {
            key: CallbackKey::PetitionSelected,
            query: number.to_string(),
        }
    }

    /// Token for a pagination action. The query encodes
    /// `offset:selectedFlag:editableFlag`.
    pub fn pagination(key: CallbackKey, offset: u32, selected: bool, editable: bool) -> Self {
        Self {
            key,
            query: format!("{}:{}:{}", offset, u8::from(selected), u8::from(editable)),
        }
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
