//! Payroute Routing: the payment route resolution pipeline.
//!
//! This crate provides:
//! - [`RouteResolver`]: one resolution per call, composing discovery, swap
//!   routing and token lookups into ranked [`PaymentRoute`]s.
//! - The pipeline stages: candidate building, direct-transfer classification,
//!   exchange augmentation, feasibility filters, amount and fee settlement,
//!   approval analysis and ranking.
//! - [`build_priority`] and the [`DripScheduler`] delivering routes early in
//!   priority order while discovery runs.

pub mod amounts;
pub mod approval;
pub mod builder;
pub mod drip;
pub mod error;
pub mod exchange;
pub mod filters;
pub mod priority;
pub mod ranking;
pub mod resolver;
pub mod route;

// Re-exports for convenience.
pub use amounts::{aggregate_to_tokens, compute_amounts, settle};
pub use approval::{check_approvals, ApprovalTransaction};
pub use builder::{build_route, convert_to_routes};
pub use drip::{DripDecision, DripScheduler, DripStep};
pub use error::{CandidateError, DripError, ResolveError};
pub use exchange::{attach_exchange_routes, exchange_request};
pub use filters::{
    classify_direct_transfers, filter_blacklisted, filter_insufficient_balance,
    filter_not_routable, required_input,
};
pub use priority::build_priority;
pub use ranking::{compare_routes, rank_routes, RankingInput, RankingPolicy};
pub use resolver::{DripReport, Resolution, ResolveOptions, RouteResolver};
pub use route::{AmountTarget, FromTokenCandidate, PaymentRoute, ToTokenAmount};
