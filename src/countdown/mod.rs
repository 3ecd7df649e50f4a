//! Countdown pages: records, persistence, and HTTP handlers.

mod model;
mod repository;
pub(crate) mod routes;

pub use model::{Countdown, CountdownInput};
pub use repository::CountdownRepository;
