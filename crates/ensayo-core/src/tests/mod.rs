//! Falsification tests for suite execution.
//!
//! Each test tries to disprove one property of the scheduler. A passing
//! test means the property survived the attempt.
//!
//! | Category | ID Range | Description |
//! |----------|----------|-------------|
//! | A | F001-F012 | Hook ordering and traversal |
//! | B | F013-F026 | Focus, skip and label filtering |
//! | C | F027-F042 | Failure isolation and timeouts |
//! | D | F043-F046 | Count and status properties |


pub use recorder::Recorder;
