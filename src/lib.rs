//! Wealth Hub — financial profile onboarding core.

pub mod config;
pub mod error;
pub mod onboarding;
pub mod store;
