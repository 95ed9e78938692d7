//! Unit tests for the access rules.

mod storage_tests;
