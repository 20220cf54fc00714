pub mod collection;
pub mod ledger;
pub mod profile;
pub mod schedule;
pub mod store;
pub mod streak;
pub mod suggestion;
pub mod task;
