//! Parsers turning raw Chia log text into typed messages.

pub mod signage_point;
