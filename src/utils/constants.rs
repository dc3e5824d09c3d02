use alloy_primitives::{Address, address};

pub const BASE_CHAIN_ID: u64 = 8453;

pub const WETH: Address = address!("0x4200000000000000000000000000000000000006");

pub const USDC: Address = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

/// Uniswap V2 WETH/USDC pair on Base
pub const WETH_USDC_POOL: Address = address!("0x88A43bb75941904d47401946215162a26bc773dc");

pub const NATIVE: Address = Address::ZERO;
