// Domain layer: table model and ports (interfaces).

pub mod model;
pub mod ports;
