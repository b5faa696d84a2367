//! Ride pricing engine: tier catalog, regional multipliers, temporal
//! pricing rules, fare calculation, and what-if simulation.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
