//! Data model shared by the scoring engine, its collaborators and the CLI.

pub mod i18n;
pub mod types;
