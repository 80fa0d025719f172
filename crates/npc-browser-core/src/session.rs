// Browse session: the batch of one browse invocation plus its filter state.
//
// Loading -> Populated -> (filtering) -> Closed. A session never returns to
// Loading; a new browse builds a new session. Filtering only flips the
// per-record visibility flags, the batch itself is never touched.

use thiserror::Error;
use tracing::debug;

use crate::campaigns::distinct_campaigns;
use crate::filter::{CampaignFilter, FilterState};
use crate::model::{NpcId, NpcRecord};
use crate::template::DialogContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Populated,
    Closed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("browse session is closed")]
    Closed,

    #[error("browse session has no batch yet")]
    NotPopulated,

    #[error("browse session already holds a batch")]
    AlreadyPopulated,
}

#[derive(Debug)]
pub struct BrowseSession {
    phase: SessionPhase,
    records: Vec<NpcRecord>,
    campaigns: Vec<String>,
    filter: FilterState,
    visible: Vec<bool>,
}

impl BrowseSession {
    /// A session waiting for its fetch to complete.
    pub fn loading() -> Self {
        BrowseSession {
            phase: SessionPhase::Loading,
            records: Vec::new(),
            campaigns: Vec::new(),
            filter: FilterState::default(),
            visible: Vec::new(),
        }
    }

    /// A session that starts populated with `records`.
    pub fn with_batch(records: Vec<NpcRecord>) -> Self {
        let mut session = Self::loading();
        session.fill(records);
        session
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Install the fetched batch. A closed session discards it.
    pub fn populate(&mut self, records: Vec<NpcRecord>) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Loading => {
                self.fill(records);
                Ok(())
            }
            SessionPhase::Populated => Err(SessionError::AlreadyPopulated),
            SessionPhase::Closed => {
                debug!(count = records.len(), "discarding batch for closed session");
                Err(SessionError::Closed)
            }
        }
    }

    fn fill(&mut self, records: Vec<NpcRecord>) {
        self.campaigns = distinct_campaigns(&records);
        self.visible = vec![true; records.len()];
        self.records = records;
        self.filter = FilterState::default();
        self.phase = SessionPhase::Populated;
    }

    /// Terminal transition. Drops the batch and any pending filter state.
    pub fn close(&mut self) {
        self.phase = SessionPhase::Closed;
        self.records.clear();
        self.campaigns.clear();
        self.visible.clear();
        self.filter = FilterState::default();
    }

    // -- Filtering ---------------------------------------------------------

    pub fn set_search_term(&mut self, term: &str) -> Result<(), SessionError> {
        self.ensure_populated()?;
        self.filter.search_term = term.to_string();
        self.refresh_visibility();
        Ok(())
    }

    /// Replace the active facet. Single-select: exactly one facet is active.
    pub fn select_campaign(&mut self, campaign: CampaignFilter) -> Result<(), SessionError> {
        self.ensure_populated()?;
        self.filter.campaign = campaign;
        self.refresh_visibility();
        Ok(())
    }

    fn refresh_visibility(&mut self) {
        for (flag, record) in self.visible.iter_mut().zip(&self.records) {
            *flag = self.filter.matches(record);
        }
    }

    fn ensure_populated(&self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Populated => Ok(()),
            SessionPhase::Loading => Err(SessionError::NotPopulated),
            SessionPhase::Closed => Err(SessionError::Closed),
        }
    }

    // -- Accessors ---------------------------------------------------------

    pub fn records(&self) -> &[NpcRecord] {
        &self.records
    }

    pub fn campaigns(&self) -> &[String] {
        &self.campaigns
    }

    /// Facet row with the leading `All` entry.
    pub fn facets(&self) -> Vec<CampaignFilter> {
        CampaignFilter::facet_row(&self.campaigns)
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        self.visible
            .iter()
            .enumerate()
            .filter(|&(_, &shown)| shown)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn visible_records(&self) -> impl Iterator<Item = &NpcRecord> {
        self.records
            .iter()
            .zip(&self.visible)
            .filter(|&(_, &shown)| shown)
            .map(|(r, _)| r)
    }

    pub fn find(&self, id: &NpcId) -> Option<&NpcRecord> {
        self.records.iter().find(|r| r.id == *id)
    }

    /// Template context for the host dialog.
    pub fn dialog_context(&self) -> DialogContext {
        DialogContext {
            npcs: self.records.clone(),
            campaigns: self.campaigns.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn npc(id: i64, name: &str, campaign: &str) -> NpcRecord {
        NpcRecord {
            id: NpcId::Int(id),
            name: name.to_string(),
            content: String::new(),
            campaign: campaign.to_string(),
            group: String::new(),
            image_url: String::new(),
        }
    }

    fn batch() -> Vec<NpcRecord> {
        vec![npc(1, "Goblin", "A"), npc(2, "Orc", "B"), npc(3, "Gnoll", "A")]
    }

    fn visible_names(session: &BrowseSession) -> Vec<&str> {
        session.visible_records().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn loading_session_rejects_filtering() {
        let mut session = BrowseSession::loading();
        assert_eq!(session.phase(), SessionPhase::Loading);
        assert_eq!(session.set_search_term("go"), Err(SessionError::NotPopulated));
        assert_eq!(
            session.select_campaign(CampaignFilter::All),
            Err(SessionError::NotPopulated)
        );
    }

    #[test]
    fn populate_shows_everything_and_derives_facets() {
        let mut session = BrowseSession::loading();
        session.populate(batch()).unwrap();
        assert_eq!(session.phase(), SessionPhase::Populated);
        assert_eq!(session.visible_indices(), vec![0, 1, 2]);
        assert_eq!(session.campaigns(), ["A".to_string(), "B".to_string()]);
        assert_eq!(session.facets()[0], CampaignFilter::All);
        assert_eq!(session.facets().len(), 3);
    }

    #[test]
    fn second_populate_is_rejected() {
        let mut session = BrowseSession::with_batch(batch());
        assert_eq!(session.populate(vec![]), Err(SessionError::AlreadyPopulated));
        assert_eq!(session.records().len(), 3);
    }

    #[test]
    fn search_and_facet_combine() {
        let mut session = BrowseSession::with_batch(batch());
        session.set_search_term("g").unwrap();
        assert_eq!(visible_names(&session), vec!["Goblin", "Gnoll"]);

        session
            .select_campaign(CampaignFilter::Campaign("B".into()))
            .unwrap();
        assert!(visible_names(&session).is_empty());

        session.set_search_term("").unwrap();
        assert_eq!(visible_names(&session), vec!["Orc"]);
    }

    #[test]
    fn selecting_a_facet_replaces_the_previous_one() {
        let mut session = BrowseSession::with_batch(batch());
        session
            .select_campaign(CampaignFilter::Campaign("A".into()))
            .unwrap();
        session
            .select_campaign(CampaignFilter::Campaign("B".into()))
            .unwrap();
        assert_eq!(session.filter().campaign, CampaignFilter::Campaign("B".into()));
        assert_eq!(visible_names(&session), vec!["Orc"]);

        session.select_campaign(CampaignFilter::All).unwrap();
        assert_eq!(session.visible_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn filtering_never_alters_the_batch() {
        let mut session = BrowseSession::with_batch(batch());
        let before = session.records().to_vec();
        session.set_search_term("zzz").unwrap();
        assert!(session.visible_indices().is_empty());
        assert_eq!(session.records(), before.as_slice());
    }

    #[test]
    fn close_is_terminal_and_discards_late_batches() {
        let mut session = BrowseSession::loading();
        session.close();
        assert_eq!(session.phase(), SessionPhase::Closed);
        assert_eq!(session.populate(batch()), Err(SessionError::Closed));
        assert!(session.records().is_empty());
        assert_eq!(session.set_search_term("x"), Err(SessionError::Closed));
    }

    #[test]
    fn close_drops_filter_state() {
        let mut session = BrowseSession::with_batch(batch());
        session.set_search_term("orc").unwrap();
        session.close();
        assert!(session.filter().search_term.is_empty());
        assert!(session.campaigns().is_empty());
    }

    #[test]
    fn find_and_dialog_context() {
        let session = BrowseSession::with_batch(batch());
        assert_eq!(session.find(&NpcId::Int(2)).map(|r| r.name.as_str()), Some("Orc"));
        assert!(session.find(&NpcId::Int(9)).is_none());

        let ctx = session.dialog_context();
        assert_eq!(ctx.npcs.len(), 3);
        assert_eq!(ctx.campaigns, vec!["A", "B"]);
    }
}
