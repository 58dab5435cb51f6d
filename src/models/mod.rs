pub mod colorize;
pub mod job;
