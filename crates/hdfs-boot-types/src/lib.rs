//! Shared types for the hdfs-boot workspace.

pub mod error;
