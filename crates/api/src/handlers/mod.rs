pub mod audit;
pub mod configs;
pub mod report;
pub mod servers;
