pub mod bounds;
pub mod builder;
pub mod calibration;
pub mod config;
pub mod constants;
pub mod geo;
pub mod map;
pub mod projection;
pub mod viewport;
