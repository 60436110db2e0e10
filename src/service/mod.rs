pub mod commands;
pub mod problem_service;

pub use commands::{Commands, Confirmation, EditMode, Notice, ProblemForm};
pub use problem_service::{ProblemService, ProblemStatistics};
