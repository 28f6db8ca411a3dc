//! The probe pipeline: window calculation, probe execution, and alerting.

pub mod alerts;
pub mod prober;
pub mod window;
