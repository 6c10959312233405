pub mod caching;
pub mod monobank;
pub mod util;
pub mod wallet_api;

pub use caching::RateCache;
pub use monobank::MonobankProvider;
pub use wallet_api::WalletApiClient;
