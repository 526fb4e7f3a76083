//! Backend for the electric-vehicle registration dashboard.
//!
//! The pipeline: raw CSV -> [`records::parse_records`] -> optional
//! [`filter::FilterSet`] -> [`aggregate::chart_summaries`] -> chart-ready
//! summaries, with [`transport`] gzipping whatever goes over the wire and
//! [`http`] exposing the single fetch endpoint.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod records;
pub mod telemetry;
pub mod transport;
