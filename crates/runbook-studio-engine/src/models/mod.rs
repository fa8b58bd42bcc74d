pub mod runbook;

pub use runbook::Runbook;
