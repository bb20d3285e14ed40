pub mod conv;
pub mod residual;

pub use conv::ConvBlock;
pub use residual::BasicBlock;
