pub mod identity;
pub mod matching;
pub mod services;
