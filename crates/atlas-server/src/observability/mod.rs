//! Observability support: metric definitions and recording helpers.

pub mod metrics;
