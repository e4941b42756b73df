pub mod drivetrain;
pub mod physics;

pub use drivetrain::{DrivetrainConfig, DrivetrainOutput, DrivetrainSimulator};
