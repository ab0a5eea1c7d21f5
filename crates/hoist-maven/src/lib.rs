//! Maven repository layout and transport: entry paths, checksum sidecars,
//! `maven-metadata.xml`, the local staging repository, and HTTP upload to
//! classic remote repositories.

pub mod checksum;
pub mod layout;
pub mod metadata;
pub mod publish;
pub mod repository;
pub mod staging;
pub mod upload;
