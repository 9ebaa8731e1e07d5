pub mod decode;
pub mod encode;
pub mod info;
pub mod runtime;
pub mod simulate;

pub use decode::{cmd_decode, DecodeArgs};
pub use encode::{cmd_encode, EncodeArgs};
pub use info::cmd_info;
pub use runtime::init_logging;
pub use simulate::{cmd_simulate, SimulateArgs};
