//! Combination space building.
//!
//! Expands segment groups into the ordered sequence of search combinations
//! the crawl walks. The ordering (group, then location, then industry code,
//! then role title) is fully deterministic so that an index into the
//! sequence is a stable resume pointer across process restarts.

use crate::definition::SegmentGroup;
use prospect_core::RegionKind;
use serde::{Deserialize, Serialize};

/// Characters stripped from title boundaries during cleaning.
const TITLE_ARTIFACTS: &[char] = &['{', '}', '[', ']', '"', '\''];

/// One (location, industry, role title) search tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCombination {
    /// Location string to search under
    pub location: String,
    /// Region classification derived from the location string
    pub region_kind: RegionKind,
    /// Industry classification code
    pub industry_code: String,
    /// Human-readable industry name
    pub industry_name: String,
    /// Cleaned role title
    pub role_title: String,
    /// Index of the originating segment group, for provenance
    pub group_index: usize,
}

/// Normalize a raw title string into zero or more clean titles.
///
/// Strips leading/trailing brace/quote artifacts, splits on commas, trims,
/// and discards empties. A single raw string may expand to multiple titles.
/// Cleaning an already-clean title returns it unchanged (idempotent).
#[must_use]
pub fn clean_titles(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_matches(TITLE_ARTIFACTS)
        .split(',')
        .map(|part| part.trim().trim_matches(TITLE_ARTIFACTS).trim())
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

/// The fully expanded, ordered combination sequence.
#[derive(Debug, Clone)]
pub struct CombinationSpace {
    combinations: Vec<SearchCombination>,
    valid_groups: usize,
}

impl CombinationSpace {
    /// Expand segment groups into the ordered combination sequence.
    ///
    /// Groups missing any parameter list are skipped entirely; this is a
    /// configuration-completeness filter, not an error.
    #[must_use]
    pub fn build(groups: &[SegmentGroup]) -> Self {
        let mut combinations = Vec::new();
        let mut valid_groups = 0;

        for (group_index, group) in groups.iter().enumerate() {
            if !group.is_complete() {
                tracing::warn!(group_index, "skipping incomplete segment group");
                continue;
            }
            valid_groups += 1;

            let titles: Vec<String> = group
                .titles
                .iter()
                .flat_map(|raw| clean_titles(raw))
                .collect();

            for location in &group.locations {
                let region_kind = RegionKind::of_location(location);
                for industry in &group.industries {
                    for title in &titles {
                        combinations.push(SearchCombination {
                            location: location.clone(),
                            region_kind,
                            industry_code: industry.code.clone(),
                            industry_name: industry.name.clone(),
                            role_title: title.clone(),
                            group_index,
                        });
                    }
                }
            }
        }

        tracing::info!(
            combinations = combinations.len(),
            valid_groups,
            skipped_groups = groups.len() - valid_groups,
            "built combination space"
        );

        Self {
            combinations,
            valid_groups,
        }
    }

    /// The ordered combination sequence.
    #[must_use]
    pub fn combinations(&self) -> &[SearchCombination] {
        &self.combinations
    }

    /// Number of combinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    /// Whether the space is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    /// How many groups passed the completeness filter. Observability only.
    #[must_use]
    pub fn valid_group_count(&self) -> usize {
        self.valid_groups
    }

    /// Consume the space, yielding the combination vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<SearchCombination> {
        self.combinations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::IndustryCode;

    fn industry(code: &str, name: &str) -> IndustryCode {
        IndustryCode {
            code: code.to_string(),
            name: name.to_string(),
        }
    }

    fn group(locations: &[&str], titles: &[&str], industries: Vec<IndustryCode>) -> SegmentGroup {
        SegmentGroup {
            locations: locations.iter().map(|s| (*s).to_string()).collect(),
            titles: titles.iter().map(|s| (*s).to_string()).collect(),
            industries,
        }
    }

    #[test]
    fn test_clean_titles_artifacts() {
        assert_eq!(
            clean_titles(r#"{"Project Manager","Site Supervisor"}"#),
            vec!["Project Manager", "Site Supervisor"]
        );
    }

    #[test]
    fn test_clean_titles_comma_joined() {
        assert_eq!(
            clean_titles("Project Manager, Site Supervisor"),
            vec!["Project Manager", "Site Supervisor"]
        );
    }

    #[test]
    fn test_clean_titles_idempotent() {
        let once = clean_titles("Project Manager");
        assert_eq!(once, vec!["Project Manager"]);
        let twice: Vec<String> = once.iter().flat_map(|t| clean_titles(t)).collect();
        assert_eq!(twice, once);
    }

    #[test]
    fn test_clean_titles_discards_empties() {
        assert_eq!(clean_titles("Estimator,, ,"), vec!["Estimator"]);
        assert!(clean_titles("").is_empty());
        assert!(clean_titles(r#"{""}"#).is_empty());
    }

    #[test]
    fn test_build_colorado_scenario() {
        // One location, one industry, one raw string carrying two titles
        let groups = vec![group(
            &["Colorado"],
            &["Project Manager, Site Supervisor"],
            vec![industry("236118", "Residential Remodelers")],
        )];

        let space = CombinationSpace::build(&groups);
        assert_eq!(space.len(), 2);
        assert_eq!(space.valid_group_count(), 1);

        let combos = space.combinations();
        assert_eq!(combos[0].location, "Colorado");
        assert_eq!(combos[0].region_kind, RegionKind::State);
        assert_eq!(combos[0].industry_code, "236118");
        assert_eq!(combos[0].role_title, "Project Manager");
        assert_eq!(combos[1].role_title, "Site Supervisor");
    }

    #[test]
    fn test_build_count_formula() {
        // |locations| x |industries| x |titles after cleaning| per group
        let groups = vec![
            group(
                &["Colorado", "Texas"],
                &["Project Manager, Estimator", "Superintendent"],
                vec![
                    industry("236118", "Residential Remodelers"),
                    industry("238160", "Roofing Contractors"),
                ],
            ),
            // Incomplete group contributes zero
            group(&["Ohio"], &[], vec![industry("236115", "New Housing")]),
        ];

        let space = CombinationSpace::build(&groups);
        assert_eq!(space.len(), 2 * 2 * 3);
        assert_eq!(space.valid_group_count(), 1);
    }

    #[test]
    fn test_build_ordering_deterministic() {
        let groups = vec![group(
            &["Colorado", "Austin, TX"],
            &["Owner"],
            vec![
                industry("236118", "Residential Remodelers"),
                industry("238160", "Roofing Contractors"),
            ],
        )];

        let a = CombinationSpace::build(&groups);
        let b = CombinationSpace::build(&groups);
        assert_eq!(a.combinations(), b.combinations());

        // location outer, industry inner
        let combos = a.combinations();
        assert_eq!(combos[0].location, "Colorado");
        assert_eq!(combos[0].industry_code, "236118");
        assert_eq!(combos[1].location, "Colorado");
        assert_eq!(combos[1].industry_code, "238160");
        assert_eq!(combos[2].location, "Austin, TX");
        assert_eq!(combos[2].region_kind, RegionKind::Metro);
    }

    #[test]
    fn test_build_empty_input() {
        let space = CombinationSpace::build(&[]);
        assert!(space.is_empty());
        assert_eq!(space.valid_group_count(), 0);
    }
}
