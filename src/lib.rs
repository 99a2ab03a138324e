//! Singapore postal-code flood risk demo.
//!
//! Resolves a postal code through OneMap (or a local address table) and
//! pairs it with simulated flood depths. The depths are random on purpose:
//! there is no flood model behind them.

pub mod assessment;
pub mod config;
pub mod location;
pub mod logging;
pub mod risk;
pub mod server;
