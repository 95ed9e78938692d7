//! Unit tests for character domain types and the registry service.
