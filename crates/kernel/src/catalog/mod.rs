//! Storefront catalog: categories and their sidebar filters.

pub mod category;
pub mod filters;

pub use category::{CATEGORIES, Category};
pub use filters::{FilterConfig, FilterControl, FilterOption};
