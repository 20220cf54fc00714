use crate::models::{collection::TaskCollection, ledger::DismissalLedger, profile::UserProfile};

/// In-memory state owned by the planner
#[derive(Default, Clone, Debug)]
pub struct Store {
    pub profile: UserProfile,
    pub tasks: TaskCollection,
    pub dismissed: DismissalLedger,
    /// Today's brain-dump text being edited
    pub brain_dump: String,
    /// Today's brain-dump title being edited
    pub brain_dump_title: String,
}
