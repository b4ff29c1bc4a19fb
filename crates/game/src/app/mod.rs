pub(crate) mod adapters;
pub(crate) mod bootstrap;
pub(crate) mod campus;
pub(crate) mod loop_runner;
