//! Deterministic `Adapter` test double plus per-scenario fixture builders,
//! used across `fathom-middleware`, `fathom-modules`, and `fathom`'s own
//! test suites so none of them touch the network.

mod fixtures;
mod mock_adapter;

pub use fixtures::{large_public_retailer_company_context, private_company_financial_profile};
pub use mock_adapter::{MockAdapter, RecordedCall};
