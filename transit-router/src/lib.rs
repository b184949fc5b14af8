//! Transit network router.
//!
//! Builds a stop graph for a set of transit routes, repairs its edge
//! costs, and answers shortest-path queries with several search
//! algorithms so their behaviour can be compared.

pub mod cache;
pub mod cost;
pub mod domain;
pub mod graph;
pub mod planner;
pub mod source;
pub mod store;
pub mod web;
