//! Domus Service — the domain services over the repository traits:
//! houses, apartments, counters, readings, events, the change-request
//! workflow and the reading reconciliation engine.
//!
//! Services are generic over the `domus-core` repository traits so the
//! same code runs against the production SurrealDB repositories and
//! the in-memory engine in tests.

pub mod apartment;
pub mod config;
pub mod counter;
pub mod event;
pub mod house;
pub mod membership;
pub mod reading;
pub mod reconcile;

pub use apartment::{AddApartmentInput, ApartmentService};
pub use config::ServiceConfig;
pub use counter::{AddCounterInput, CounterService};
pub use event::EventService;
pub use house::{HouseInfoUpdate, HouseService};
pub use reading::{MonthRange, ReadingService};
pub use reconcile::{MonthlyReport, ReadingTable, ReconcileService, TableRow};
