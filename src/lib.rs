//! Rategate - Request Admission Control Service
//!
//! Decides, per incoming request, whether to allow or reject it based on a
//! rate budget keyed by client identity (API token, else source address),
//! enforced identically against an in-process store or a shared Redis store.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
