//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against the scripted level source in `mock_hw`.  All tests run on the
//! host (x86_64) with no real hardware required.

mod gesture_flow_tests;
mod mock_hw;
mod registry_tests;
