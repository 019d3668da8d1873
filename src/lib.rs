//! Report presentation engine for a retail point-of-sale backend: a catalog
//! of server-side reports, request shaping, payload normalization into
//! tables, column formatting, summary cards and spreadsheet export.

pub mod catalog;
pub mod classify;
pub mod client;
pub mod error;
pub mod export;
pub mod fmt;
pub mod invoker;
pub mod logging;
pub mod normalize;
pub mod params;
pub mod settings;
pub mod summary;
