//! Report extraction from tool-generated documents.

pub mod html;
