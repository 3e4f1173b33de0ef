//! Presentation layer: view models backing the askama templates.

pub mod views;
