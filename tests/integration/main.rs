//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no controller
//! attached.

mod mock_hw;
mod render_tests;
mod service_tests;
mod sim_tests;
mod vision_tests;
