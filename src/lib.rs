//! Cross-architecture summaries of manylinux image reports.
//!
//! Each image is probed once per architecture and the commands it ran are
//! recorded in a log. This crate derives display fields from those logs and
//! joins them into one summary per version.
pub mod arch;
pub mod cli;
pub mod config;
pub mod exit;
pub mod field;
pub mod index;
pub mod log;
pub mod name;
pub mod render;
pub mod report;
pub mod standards;
pub mod summary;
pub mod tag;
pub mod version;
