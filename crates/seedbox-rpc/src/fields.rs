//! Compile-time wire field lists.
//!
//! `torrent-get` requires the caller to name every field it wants back.
//! Rather than maintain that list by hand, records derive [`WireFields`]
//! and the list follows the struct's declared shape and serde attributes.

pub use seedbox_macros::WireFields;

/// Types that can list the JSON keys they serialize to.
pub trait WireFields {
    /// Wire names in declaration order, flattened records expanded in place.
    fn wire_fields() -> Vec<&'static str>;
}
