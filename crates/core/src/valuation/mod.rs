//! Portfolio valuation from holding quantities and recorded prices.

mod valuation_model;
mod valuation_service;
mod valuation_traits;


pub use valuation_model::PortfolioDailyValue;
pub use valuation_service::ValuationService;
pub use valuation_traits::ValuationServiceTrait;
