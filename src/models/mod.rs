pub mod enums;
pub mod observation;

pub use observation::*;
pub use report_test::*;
