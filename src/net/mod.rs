pub mod agent;
pub mod controller;
