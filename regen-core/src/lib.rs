pub mod checkers;
pub mod domain;
pub mod features;
pub mod generator;
pub mod generators;
pub mod keywords;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod reflection;
pub mod syntax;
