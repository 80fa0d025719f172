// Client-side filtering: search term plus single-select campaign facet.
//
// Kept free of any UI types so every host binding (terminal, web, test)
// calls the same predicate.

use crate::model::NpcRecord;

// ---------------------------------------------------------------------------
// CampaignFilter
// ---------------------------------------------------------------------------

/// One entry of the facet row. `All` is always offered first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CampaignFilter {
    #[default]
    All,
    Campaign(String),
}

impl CampaignFilter {
    /// Build the facet row for a set of distinct campaigns.
    pub fn facet_row(campaigns: &[String]) -> Vec<CampaignFilter> {
        std::iter::once(CampaignFilter::All)
            .chain(campaigns.iter().cloned().map(CampaignFilter::Campaign))
            .collect()
    }

    pub fn label(&self) -> &str {
        match self {
            CampaignFilter::All => "All",
            CampaignFilter::Campaign(name) => name,
        }
    }
}

// ---------------------------------------------------------------------------
// FilterState
// ---------------------------------------------------------------------------

/// The two independent predicates of a browse session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub search_term: String,
    pub campaign: CampaignFilter,
}

impl FilterState {
    pub fn new(search_term: &str, campaign: CampaignFilter) -> Self {
        FilterState {
            search_term: search_term.to_string(),
            campaign,
        }
    }

    /// True when `record` passes both predicates.
    pub fn matches(&self, record: &NpcRecord) -> bool {
        self.matches_search(record) && self.matches_campaign(record)
    }

    fn matches_search(&self, record: &NpcRecord) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let term = self.search_term.to_lowercase();
        [&record.name, &record.content, &record.group]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    fn matches_campaign(&self, record: &NpcRecord) -> bool {
        match &self.campaign {
            CampaignFilter::All => true,
            CampaignFilter::Campaign(name) => record.campaign == *name,
        }
    }
}

/// Indices of the records visible under `(search_term, campaign)`.
pub fn visible_set(batch: &[NpcRecord], search_term: &str, campaign: &CampaignFilter) -> Vec<usize> {
    let state = FilterState::new(search_term, campaign.clone());
    batch
        .iter()
        .enumerate()
        .filter(|(_, r)| state.matches(r))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NpcId;

    fn npc(id: i64, name: &str, content: &str, campaign: &str, group: &str) -> NpcRecord {
        NpcRecord {
            id: NpcId::Int(id),
            name: name.to_string(),
            content: content.to_string(),
            campaign: campaign.to_string(),
            group: group.to_string(),
            image_url: String::new(),
        }
    }

    fn sample() -> Vec<NpcRecord> {
        vec![
            npc(1, "Goblin", "", "A", ""),
            npc(2, "Orc", "Hates goblins", "B", ""),
            npc(3, "Mayor Elda", "Runs the town", "A", "Council"),
            npc(4, "Hermit", "", "", "Hollow Grove"),
        ]
    }

    fn names(batch: &[NpcRecord], indices: &[usize]) -> Vec<String> {
        indices.iter().map(|&i| batch[i].name.clone()).collect()
    }

    #[test]
    fn goblin_search_across_all_campaigns() {
        let batch = vec![npc(1, "Goblin", "", "A", ""), npc(2, "Orc", "", "B", "")];
        let visible = visible_set(&batch, "go", &CampaignFilter::All);
        assert_eq!(names(&batch, &visible), vec!["Goblin"]);
    }

    #[test]
    fn empty_predicates_show_everything() {
        let batch = sample();
        assert_eq!(visible_set(&batch, "", &CampaignFilter::All), vec![0, 1, 2, 3]);
    }

    #[test]
    fn search_covers_content_and_group_case_insensitively() {
        let batch = sample();
        assert_eq!(
            names(&batch, &visible_set(&batch, "GOBLIN", &CampaignFilter::All)),
            vec!["Goblin", "Orc"]
        );
        assert_eq!(
            names(&batch, &visible_set(&batch, "grove", &CampaignFilter::All)),
            vec!["Hermit"]
        );
        assert_eq!(
            names(&batch, &visible_set(&batch, "council", &CampaignFilter::All)),
            vec!["Mayor Elda"]
        );
    }

    #[test]
    fn campaign_is_exact_match() {
        let batch = sample();
        let a = CampaignFilter::Campaign("A".into());
        assert_eq!(names(&batch, &visible_set(&batch, "", &a)), vec!["Goblin", "Mayor Elda"]);

        let lower = CampaignFilter::Campaign("a".into());
        assert!(visible_set(&batch, "", &lower).is_empty());
    }

    #[test]
    fn both_predicates_must_match() {
        let batch = sample();
        let b = CampaignFilter::Campaign("B".into());
        assert_eq!(names(&batch, &visible_set(&batch, "goblin", &b)), vec!["Orc"]);
        assert!(visible_set(&batch, "mayor", &b).is_empty());
    }

    #[test]
    fn campaign_is_not_searched() {
        let only_campaign = vec![npc(9, "Nobody", "", "Zephyr", "")];
        assert!(visible_set(&only_campaign, "zephyr", &CampaignFilter::All).is_empty());
    }

    #[test]
    fn facet_row_starts_with_all() {
        let row = CampaignFilter::facet_row(&["A".to_string(), "B".to_string()]);
        assert_eq!(
            row,
            vec![
                CampaignFilter::All,
                CampaignFilter::Campaign("A".into()),
                CampaignFilter::Campaign("B".into()),
            ]
        );
        assert_eq!(row[0].label(), "All");
        assert_eq!(row[2].label(), "B");
    }
}
