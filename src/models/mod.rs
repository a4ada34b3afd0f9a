pub mod simulation;
pub mod weather;
