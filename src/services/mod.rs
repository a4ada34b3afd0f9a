pub mod aggregator;
pub mod clear_sky;
pub mod decomposition;
pub mod interpolation;
pub mod pipeline;
pub mod poa;
pub mod power_model;
pub mod record_store;
pub mod solar_geometry;
