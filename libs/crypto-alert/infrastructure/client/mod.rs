//! External API clients

pub mod coinbase;

pub use coinbase::{CoinbaseClient, CoinbaseError, CoinbaseSampleSource, SymbolCatalog};
