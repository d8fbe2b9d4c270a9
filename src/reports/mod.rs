// Reports module - quote assembly over scenarios and marketplaces

pub mod quote;

pub use quote::{build_quote, ImportQuote, MarketplaceQuote, ScenarioCost};
