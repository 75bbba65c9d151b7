//! Subscriber model.
//!
//! Subscribers are owned by the conversational bot layer; this subsystem
//! only reads the set for broadcasts and deletes entries whose delivery
//! permanently fails.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// An addressable notification recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Opaque numeric id assigned by the delivery channel.
    pub id: i64,
    /// Favorited petition numbers.
    #[serde(default)]
    pub petitions: HashSet<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl Subscriber {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            petitions: HashSet::new(),
            is_admin: false,
        }
    }
}
