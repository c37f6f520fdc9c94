//! Configuration Layer

mod loader;

pub use loader::{
    Config, ConfigError, DexscreenerSection, GeckoSection, LoggingSection, OracleSection,
    StoreSection, TokensSection, load_config,
};
