//! Test-only support shared by the module tests, plus the end-to-end test.

pub mod mock_broker;
