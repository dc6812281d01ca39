//! Wallet capability interface and the connection state machine built on it.

mod adapter;
mod connector;

pub use adapter::{SimulatedWallet, WalletAdapter, WalletError};
pub use connector::{
    BALANCE_NOTICE, BalanceState, ConnectionState, LAMPORTS_PER_SOL, WalletConnector,
};
