pub mod signing;

pub use signing::{
    BlockingReason, SigningDecision, SigningGateInput, SigningGateMetrics, decide,
};
