pub mod matcher;
pub mod similarity;

pub use matcher::{MatchOutcome, Matcher, DEFAULT_MATCH_THRESHOLD};
pub use similarity::similarity;
