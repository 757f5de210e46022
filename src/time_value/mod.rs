//! Time-value-of-money math: present value, NPV, IRR, payback

mod discount;
mod irr;
mod payback;

pub use discount::{discounted_payback, npv, present_value};
pub use irr::{irr, IrrSolver, DEFAULT_IRR_LOWER, DEFAULT_IRR_UPPER, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
pub use payback::payback_months;
