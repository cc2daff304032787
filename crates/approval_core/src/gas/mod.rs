pub mod cost;
pub mod market;
pub mod plan;
pub mod policy;
pub mod quantity;
pub mod ratio;
pub mod recommend;
pub mod solver;

pub use cost::{GasCost, explain_gas};
pub use market::{GasLevel, GasLevelKind, LastGasSelection, max_priority_fee, select_gas_level};
pub use plan::{GasPlan, GasPlanInput, build_gas_plan};
pub use policy::{GasPolicy, MINIMUM_GAS_LIMIT};
pub use ratio::GasLimitRatio;
pub use recommend::{
    GasRecommendInput, GasRecommendation, GasSource, NonceRecommendError, next_nonce,
    next_safe_nonce, recommend_gas, recommend_nonce, resolve_safe_nonce,
};
pub use solver::{GasLimitSolution, GasLimitSolveInput, PendingTxCost, SolverBranch, solve_gas_limit};
