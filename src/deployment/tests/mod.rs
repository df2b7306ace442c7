//! Unit tests for the deployment module.

mod orchestrator_tests;
