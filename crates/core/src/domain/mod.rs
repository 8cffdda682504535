pub mod inputs;
pub mod reference;
pub mod results;
pub mod telemetry;
pub mod vendor;
