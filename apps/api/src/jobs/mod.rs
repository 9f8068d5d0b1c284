// Resume jobs: in-memory lifecycle, background processing and the HTTP surface.

pub mod handlers;
pub mod models;
pub mod store;
pub mod worker;
