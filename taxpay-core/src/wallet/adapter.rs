use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("wallet connection rejected: {0}")]
    ConnectionRejected(String),

    #[error("wallet is not connected")]
    NotConnected,

    #[error("could not fetch balance: {0}")]
    Balance(String),

    #[error("could not disconnect wallet: {0}")]
    Disconnect(String),
}

/// Capabilities the flow needs from a host wallet library.
///
/// Balances are reported in the chain's smallest unit (lamports for SOL).
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Display name of the wallet (e.g. `Phantom`).
    fn name(&self) -> &str;

    /// Opens the wallet's approval prompt and returns the public address.
    async fn connect(&mut self) -> Result<String, WalletError>;

    async fn disconnect(&mut self) -> Result<(), WalletError>;

    async fn get_balance(
        &self,
        address: &str,
    ) -> Result<u64, WalletError>;

    /// Address of the live connection, if any.
    fn current_address(&self) -> Option<String>;
}

/// In-process wallet with a fixed address, used by the walkthrough and tests.
#[derive(Debug, Clone)]
pub struct SimulatedWallet {
    address: String,
    connected: bool,
    balance: Result<u64, String>,
    reject_connect: Option<String>,
    balance_requests: Arc<AtomicUsize>,
}

impl SimulatedWallet {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connected: false,
            balance: Ok(0),
            reject_connect: None,
            balance_requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_balance(
        mut self,
        lamports: u64,
    ) -> Self {
        self.balance = Ok(lamports);
        self
    }

    pub fn with_balance_failure(
        mut self,
        reason: impl Into<String>,
    ) -> Self {
        self.balance = Err(reason.into());
        self
    }

    pub fn rejecting(
        mut self,
        reason: impl Into<String>,
    ) -> Self {
        self.reject_connect = Some(reason.into());
        self
    }

    /// Drops the connection from the wallet side, as a browser extension would.
    pub fn sever(&mut self) {
        self.connected = false;
    }

    /// Number of balance fetches served so far.
    pub fn balance_requests(&self) -> usize {
        self.balance_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletAdapter for SimulatedWallet {
    fn name(&self) -> &str {
        "Simulated Wallet"
    }

    async fn connect(&mut self) -> Result<String, WalletError> {
        if let Some(reason) = &self.reject_connect {
            return Err(WalletError::ConnectionRejected(reason.clone()));
        }
        self.connected = true;
        Ok(self.address.clone())
    }

    async fn disconnect(&mut self) -> Result<(), WalletError> {
        self.connected = false;
        Ok(())
    }

    async fn get_balance(
        &self,
        address: &str,
    ) -> Result<u64, WalletError> {
        self.balance_requests.fetch_add(1, Ordering::SeqCst);
        if !self.connected || address != self.address {
            return Err(WalletError::NotConnected);
        }
        self.balance.clone().map_err(WalletError::Balance)
    }

    fn current_address(&self) -> Option<String> {
        self.connected.then(|| self.address.clone())
    }
}
