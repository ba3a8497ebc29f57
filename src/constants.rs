#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Name given to the synthetic test entry of a fatal report
pub const FATAL_TEST_NAME: &str = "FATAL";

/// Question number given to the synthetic test entry of a fatal report
pub const FATAL_QUESTION: u32 = 0;

/// Message attached to the synthetic test entry of a fatal report
pub const FATAL_MESSAGE: &str = "An error occurred while running your code.";

/// Prefix added to the message of a graded method that returned a partial
/// credit error
pub const INCORRECT_ANSWER_PREFIX: &str = "Incorrect answer: ";

/// Serialized in place of the overall score when a report never received one
pub const MISSING_SCORE: &str = "MISSING";

/// Default file the `json` reporter writes to
pub const DEFAULT_SCORE_FILE: &str = "score.json";

/// Default log filter for the binary
pub const DEFAULT_LOG_FILTER: &str = "info";
