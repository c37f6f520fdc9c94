//! Domain Layer
//!
//! Pure business types for the oracle: validated quotes, the published
//! snapshot rows, the TTL quote cache, and the token universe.

pub mod cache;
pub mod price_data;
pub mod quote;
pub mod tokens;

pub use cache::{Lookup, QuoteCache};
pub use price_data::{build_view_url, derive_baseline, PriceData, SOURCE_CACHED};
pub use quote::{is_hex_pair_address, pick_change_pct, Quote};
pub use tokens::{extract_pair_address, load_universe, Token};
