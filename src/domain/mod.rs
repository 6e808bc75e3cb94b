// Domain layer: session models and ports. Only std/serde here.

pub mod model;
pub mod ports;
pub mod summary;
