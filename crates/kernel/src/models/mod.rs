//! Data models.
//!
//! Listing records as they come from the record store, plus the auction
//! countdown derived from them.

mod auction;
mod listing;

pub use auction::{AuctionStatus, TimeRemaining};
pub use listing::{BillingType, ListingRecord, coerce_number};
