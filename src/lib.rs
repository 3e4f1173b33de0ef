//! viaggio: a calm, server-rendered reading front-end for headless content
//! APIs. Fetches post summaries and documents from an external content
//! service and renders a paginated feed plus a reading view.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
