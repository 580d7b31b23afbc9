//! Media activity use cases.
//!
//! device graph
//!     ↓
//! ScanMediaCapabilities   → capability summaries
//!     ↓
//! DeriveMediaEndpoints    → derived endpoints (never stored)
//!     ↓
//! ActivityBindingService  → persisted bindings
//!     ↓
//! MediaActivityOrchestrator → plan → dispatch → record + events

pub mod activity;
pub mod bindings;
pub mod derive_media_endpoints;
pub mod facade;
pub mod scan_media_capabilities;

pub use derive_media_endpoints::DeriveMediaEndpoints;
pub use scan_media_capabilities::ScanMediaCapabilities;
