pub mod catalog;
pub mod configuration;
pub mod email;
pub mod media;
pub mod middleware;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod token;
pub mod util;
