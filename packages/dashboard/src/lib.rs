#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Session state and data pipeline for the MLS locator dashboard.
//!
//! Data flows one way: the [`loader`] fetches through a
//! [`PointApi`](mls_locator_client::PointApi), the
//! [`DashboardSession`] applies results to its [`PointStore`], the
//! [`stats`] and [`filter`] modules derive counts and the visible rows, and
//! [`projection`] turns all of it into view data for a renderer.

pub mod fallback;
pub mod filter;
pub mod loader;
pub mod notify;
pub mod progress;
pub mod projection;
pub mod session;
pub mod stats;
pub mod store;

#[cfg(test)]
mod testing;

pub use filter::{PAGE_SIZE, SelectionState, TableFilter};
pub use loader::DataOrigin;
pub use session::{Connectivity, DashboardSession, ReloadOutcome, ReloadTicket, ViewState};
pub use stats::PointStats;
pub use store::PointStore;
