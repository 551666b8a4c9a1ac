// Domain layer: request/account models and the port to the auth collaborator.

pub mod model;
pub mod ports;
