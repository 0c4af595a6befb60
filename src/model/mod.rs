pub mod connection;
pub mod criteria;
pub mod ledger;
pub mod session;

#[cfg(test)]
pub mod fixtures;
