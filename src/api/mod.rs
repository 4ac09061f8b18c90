//! HTTP API.
//!
//! ## Endpoints
//!
//! - `GET  /api/health` - Liveness and provider order
//! - `POST /api/pricing/calculate` - Unit economics at a given price
//! - `POST /api/pricing/optimal` - Price that reaches a target margin
//! - `POST /api/pricing/fees` - Fee comparison across marketplaces
//! - `POST /api/pricing/record` - Timestamped pricing snapshot
//! - `POST /api/pricing/materials/total` - Bill of materials total
//! - `POST /api/pricing/monitor/evaluate` - Material price movement check
//! - `POST /api/advisory` - Any advisory use case, tagged by `use_case`
//! - `POST /api/advisory/competitive` - Optimal price plus market advice
//! - `POST /api/advisory/materials` - Cheaper supplier suggestions
//! - `POST /api/advisory/parse` - Free-text quantity request parsing
//! - `POST /api/advisory/market-price` - Current market price lookup

pub mod advisory;
pub mod pricing;
mod routes;

pub use routes::{router, serve, AppState};
