//! Unit tests for generation task domain types and services.

mod domain_tests;
