//! This module defines the `CounterAuditor`, a maintenance pass that checks
//! item counters against the vote records they summarize.
use std::sync::Arc;
use forum_votes_repository::AuditRepository;
use forum_votes_shared::types::{ItemTally, RepairPlan};
use tracing::{info, warn};
use crate::errors::AuditError;

/// What an audit run found and fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub items_checked: usize,
    pub drifted: Vec<ItemTally>,
    pub orphans_found: usize,
    pub orphans_removed: usize,
    pub repaired: bool,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.drifted.is_empty() && self.orphans_found == 0
    }
}

pub struct CounterAuditor {
    repository: Arc<dyn AuditRepository>,
}

impl CounterAuditor {
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self { repository }
    }

    /// Recounts every item and looks for orphaned vote records.
    ///
    /// With `repair`, drifted counters are recounted again under the repair's
    /// own locks, orphans are deleted and author reputation is rebuilt, all
    /// in one transaction. Votes committed after the tally are kept.
    pub async fn run(&self, repair: bool) -> Result<AuditReport, AuditError> {
        let tallies = self.repository.tally_items().await?;
        let items_checked = tallies.len();
        let drifted: Vec<ItemTally> = tallies.into_iter().filter(ItemTally::has_drift).collect();
        let orphans = self.repository.find_orphan_votes().await?;

        for tally in &drifted {
            warn!(
                item_type = %tally.item.item_type(),
                item_id = tally.item.item_id(),
                stored_helpful = tally.stored.helpful,
                stored_not_helpful = tally.stored.not_helpful,
                recounted_helpful = tally.recounted.helpful,
                recounted_not_helpful = tally.recounted.not_helpful,
                "counter drift detected"
            );
        }

        let mut report = AuditReport {
            items_checked,
            orphans_found: orphans.len(),
            drifted,
            ..Default::default()
        };

        if repair {
            let plan = RepairPlan {
                items: report.drifted.iter().map(|tally| tally.item.clone()).collect(),
                orphans,
            };
            self.repository.apply_repair(&plan).await?;
            report.orphans_removed = plan.orphans.len();
            report.repaired = true;
        }

        info!(
            items_checked = report.items_checked,
            drifted = report.drifted.len(),
            orphans_found = report.orphans_found,
            orphans_removed = report.orphans_removed,
            repaired = report.repaired,
            "counter audit finished"
        );
        Ok(report)
    }
}
