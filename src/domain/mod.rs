// Domain layer: model-side values, type tags and ports (interfaces).

pub mod fields;
pub mod model;
pub mod ports;
