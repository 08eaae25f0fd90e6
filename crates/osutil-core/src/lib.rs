pub mod config;
pub mod factory;
pub mod hasher;
pub mod runner;
