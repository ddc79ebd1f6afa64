//! `clinica-web`
//!
//! **Responsibility:** the clinic single-page client.
//!
//! This crate provides:
//! - The route table and the role requirement of every destination
//! - Role-specific navigation
//! - Client-side filtering/sorting of backend collections
//! - The Leptos frontend (wasm32 only) wiring the session and the guard
//!
//! The client is a **thin shell** around the clinic REST API.

pub mod navigation;
pub mod routes;
pub mod table;

#[cfg(target_arch = "wasm32")]
pub mod frontend;

pub use navigation::{NavLink, Section, nav_links, section_at, sections_for};
pub use routes::{AppRoute, home_for, requested_location};
