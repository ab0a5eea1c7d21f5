//! Deploy pipeline operations: artifact collection, the per-unit
//! orchestrator, pluggable publishers, and the `deploy`, `stage`, `push`
//! and `verify` entry points used by the CLI.

pub mod collect;
pub mod orchestrator;
pub mod ops_deploy;
pub mod ops_push;
pub mod ops_stage;
pub mod ops_verify;
pub mod publisher;
pub mod retry;
