//! Client side of the remote ERP's SQL query web service.

pub mod client;
pub mod envelope;
