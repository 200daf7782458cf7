//! Field sanitizers and row filters for record cleaning
//!
//! Fixed-policy rules: email placeholder detection and format validation,
//! phone digit normalization, and the presence check that classifies records
//! by how many identifying fields they carry.

pub mod email;
pub mod phone;
pub mod presence_filter;
