// Domain layer: core models, ports (interfaces) and the extraction rule table.

pub mod model;
pub mod ports;
pub mod rules;
