//! OCI artifact packaging and registry push.
//!
//! A staging directory is packed into one deterministic `tar+gzip` layer,
//! annotated so ORAS-compatible clients unpack it back into a directory,
//! and pushed with an empty config blob.

pub mod auth;
pub mod bundle;
pub mod push;
pub mod target;
