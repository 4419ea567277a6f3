pub mod health;
pub mod metrics;
pub mod strategy;
pub mod tasks;
pub mod workers;
