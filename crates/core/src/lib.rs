pub mod config;
pub mod domain;
pub mod errors;
pub mod sensitivity;
pub mod tco;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::inputs::{CalculationInputs, CostParameters, NetworkRequirements, OrganizationSize};
pub use domain::reference::ReferenceTables;
pub use domain::results::{
    BusinessValue, ComparativeAnalysis, CostBreakdown, RoiResult, TcoResult, VendorMetrics,
};
pub use domain::vendor::{DeploymentModel, FteEstimate, PricingModel, VendorId, VendorProfile};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use sensitivity::metrics::{Breakeven, ElasticityBand, SweepMetrics};
pub use sensitivity::parameter::SensitivityParameter;
pub use sensitivity::tornado::{TornadoAnalysis, TornadoEntry};
pub use sensitivity::{
    CancellationToken, MultiParameterAnalysis, ParameterSweep, SensitivityEngine,
    SensitivityError, SensitivityResult,
};
pub use tco::assumptions::ModelAssumptions;
pub use tco::catalog::VendorCatalog;
pub use tco::{DeterministicTcoCalculator, TcoCalculator};
