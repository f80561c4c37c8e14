//! Marketplace core: pricing, catalog, booking ledger, notification feeds,
//! reviews and owner reports, composed by [`market::Marketplace`].

pub mod catalog;
pub mod error;
pub mod ledger;
pub mod market;
pub mod notifications;
pub mod pricing;
pub mod report;
pub mod reviews;

pub use error::{MarketError, MarketResult};
pub use market::{Applied, MarketSnapshot, Marketplace, Notice};

#[cfg(test)]
mod testing;
