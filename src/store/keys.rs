//! Redis key manager
//!
//! Provides unified Redis key naming convention for the capsule store.

/// Redis key prefix
const PREFIX: &str = "postdate";

/// Redis key manager
#[derive(Debug, Clone)]
pub struct Keys;

impl Keys {
    /// Capsule record key (Hash)
    /// Example: postdate:capsule:a1b2c3d4-...
    pub fn capsule(id: &str) -> String {
        format!("{}:capsule:{}", PREFIX, id)
    }

    /// Due index key (ZSet scored by unlock timestamp)
    /// Example: postdate:due
    pub fn due() -> String {
        format!("{}:due", PREFIX)
    }

    /// Creation index key (ZSet scored by creation timestamp)
    /// Example: postdate:created
    pub fn created() -> String {
        format!("{}:created", PREFIX)
    }
}
