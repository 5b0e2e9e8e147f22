pub mod config;
pub mod dedup;
pub mod domain {
    pub mod event;
    pub mod state;
}
pub mod ledger;
pub mod queue;
pub mod retry;
pub mod rules;
pub mod worker;
