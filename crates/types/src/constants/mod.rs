pub mod addresses;
pub mod limits;

pub use addresses::{
	is_zero_address, wrapped_native_address, PLACEHOLDER_USER_ADDRESS, TON_NATIVE_ADDRESS,
	TRON_NATIVE_ADDRESS, WRAPPED_SOL_MINT, ZERO_ADDRESS,
};
