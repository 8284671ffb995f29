pub mod dedup;
pub mod recent;
pub mod tracker;

pub use dedup::DedupStore;
pub use recent::RecentCache;
pub use tracker::{Snapshot, Tracker};
