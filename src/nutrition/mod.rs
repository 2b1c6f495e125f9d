pub mod energy;
pub mod scaler;
pub mod units;

pub use energy::MacroDistribution;
pub use scaler::{scale, Nutrients, Quantity, REFERENCE_AMOUNT};
pub use units::Unit;
