//! Unit tests for identities, profile projection and account removal.
