// Domain layer: job model and the converter port. No I/O here.

pub mod model;
pub mod ports;
