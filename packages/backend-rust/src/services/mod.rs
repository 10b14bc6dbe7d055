pub mod affinity;
pub mod token;

pub use affinity::{AffinityError, AffinityService};
pub use token::{RandomTokenGenerator, TokenGenerator};
