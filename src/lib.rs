//! Datadock - Multi-service data backend
//!
//! This crate implements an API service for user accounts and data records
//! plus a queue consumer that reacts to registrations, sharing a
//! connection-resilience layer for the cache and broker clients.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
