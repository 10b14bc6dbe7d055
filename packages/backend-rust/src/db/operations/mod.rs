pub mod assignment;
pub mod content;
pub mod learner;

pub use assignment::*;
pub use content::*;
pub use learner::*;
