pub mod clock;
pub mod config;
pub mod models;
pub mod planner;
pub mod services;
pub mod storage;

pub use planner::{LaunchState, Planner};
