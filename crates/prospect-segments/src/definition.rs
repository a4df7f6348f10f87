//! Search-parameter group definitions.
//!
//! Groups are loaded from TOML files and pair locations with industry codes
//! and role titles. A group missing any of the three lists is incomplete and
//! is filtered out at build time rather than treated as an error.

use serde::{Deserialize, Serialize};

/// One industry classification entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryCode {
    /// Classification code (e.g. NAICS "236118")
    pub code: String,
    /// Human-readable industry name
    pub name: String,
}

/// One group of search parameters.
///
/// Title strings are raw as configured and may carry delimiter artifacts
/// (stray braces/quotes, comma-joined sub-titles); cleaning happens in the
/// combination builder, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentGroup {
    /// Locations to search (state names or metro strings)
    #[serde(default)]
    pub locations: Vec<String>,
    /// Raw role-title strings
    #[serde(default)]
    pub titles: Vec<String>,
    /// Industry code entries
    #[serde(default)]
    pub industries: Vec<IndustryCode>,
}

impl SegmentGroup {
    /// Whether the group carries all three parameter lists.
    ///
    /// Incomplete groups contribute zero combinations.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.locations.is_empty() && !self.titles.is_empty() && !self.industries.is_empty()
    }
}

/// Top-level shape of a segment TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SegmentFile {
    /// The `[[group]]` tables in the file
    #[serde(default, rename = "group")]
    pub groups: Vec<SegmentGroup>,
}
