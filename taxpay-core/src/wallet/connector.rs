//! Connection lifecycle over a [`WalletAdapter`].
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Connected { balance: Loading -> Available | Unavailable }
//!      ^                        |
//!      +-------- error ---------+
//! ```
//!
//! The first time a connection is observed the connector records the
//! connection time, fetches the native balance once and returns the address
//! for the flow controller. Later syncs on the same connection return `None`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::adapter::{WalletAdapter, WalletError};

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

pub const BALANCE_NOTICE: &str = "Could not fetch wallet balance. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceState {
    Loading,
    /// Balance in SOL.
    Available(Decimal),
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected {
        address: String,
        connected_at: DateTime<Utc>,
        balance: BalanceState,
    },
}

pub struct WalletConnector<A: WalletAdapter> {
    adapter: A,
    state: ConnectionState,
    notified: bool,
    notices: Vec<String>,
}

impl<A: WalletAdapter> WalletConnector<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            state: ConnectionState::Disconnected,
            notified: false,
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// Non-fatal notices not yet taken (oldest first).
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Drains pending notices so each is shown once.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn balance(&self) -> Option<&BalanceState> {
        match &self.state {
            ConnectionState::Connected { balance, .. } => Some(balance),
            _ => None,
        }
    }

    /// Asks the wallet to connect.
    ///
    /// Returns the address the first time this connection is established,
    /// `None` if the flow was already told about it.
    pub async fn connect(&mut self) -> Result<Option<String>, WalletError> {
        if matches!(self.state, ConnectionState::Connected { .. }) {
            return Ok(self.sync().await);
        }

        debug!(wallet = self.adapter.name(), "opening wallet connection");
        self.notified = false;
        self.state = ConnectionState::Connecting;

        match self.adapter.connect().await {
            Ok(_) => Ok(self.sync().await),
            Err(error) => {
                warn!(%error, "wallet connection failed");
                self.state = ConnectionState::Disconnected;
                Err(error)
            }
        }
    }

    /// Reconciles local state with the adapter.
    ///
    /// Safe to call any number of times; only the first observation of a
    /// connection yields `Some(address)`.
    pub async fn sync(&mut self) -> Option<String> {
        let Some(address) = self.adapter.current_address() else {
            if !matches!(self.state, ConnectionState::Disconnected) {
                info!("wallet disconnected by adapter");
                self.reset();
            }
            return None;
        };

        if self.notified {
            return None;
        }

        self.state = ConnectionState::Connected {
            address: address.clone(),
            connected_at: Utc::now(),
            balance: BalanceState::Loading,
        };

        let fetched = self.fetch_balance(&address).await;
        if let ConnectionState::Connected { balance, .. } = &mut self.state {
            *balance = fetched;
        }
        self.notified = true;

        info!(
            wallet = self.adapter.name(),
            address = %short_address(&address),
            "wallet connected"
        );
        Some(address)
    }

    /// Disconnects and clears balance, connection time and notification state.
    ///
    /// On failure the connection is left as it was and a notice is recorded.
    pub async fn disconnect(&mut self) -> Result<(), WalletError> {
        if let Err(error) = self.adapter.disconnect().await {
            warn!(%error, "wallet disconnect failed");
            self.notices
                .push("Could not disconnect wallet. Please try again.".to_string());
            return Err(error);
        }
        self.reset();
        info!("wallet disconnected");
        Ok(())
    }

    fn reset(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.notified = false;
    }

    async fn fetch_balance(
        &mut self,
        address: &str,
    ) -> BalanceState {
        match self.adapter.get_balance(address).await {
            Ok(lamports) => {
                let sol = Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL);
                debug!(%sol, "balance fetched");
                BalanceState::Available(sol)
            }
            Err(error) => {
                warn!(%error, "balance fetch failed");
                self.notices.push(BALANCE_NOTICE.to_string());
                BalanceState::Unavailable
            }
        }
    }
}

/// `ABCD...WXYZ` form used in log lines.
fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 8 {
        return address.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::wallet::SimulatedWallet;

    const ADDRESS: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    fn connector(wallet: SimulatedWallet) -> WalletConnector<SimulatedWallet> {
        WalletConnector::new(wallet)
    }

    #[tokio::test]
    async fn starts_disconnected() {
        let connector = connector(SimulatedWallet::new(ADDRESS));

        assert_eq!(connector.state(), &ConnectionState::Disconnected);
        assert_eq!(connector.balance(), None);
    }

    #[tokio::test]
    async fn connect_notifies_once_with_balance_in_sol() {
        let mut connector = connector(SimulatedWallet::new(ADDRESS).with_balance(2_500_000_000));

        let first = connector.connect().await.unwrap();
        let resync = connector.sync().await;
        let reconnect = connector.connect().await.unwrap();

        assert_eq!(first, Some(ADDRESS.to_string()));
        assert_eq!(resync, None);
        assert_eq!(reconnect, None);
        assert_eq!(connector.balance(), Some(&BalanceState::Available(dec!(2.5))));
        assert_eq!(connector.adapter().balance_requests(), 1);
    }

    #[tokio::test]
    async fn balance_failure_is_a_notice_not_an_error() {
        let mut connector =
            connector(SimulatedWallet::new(ADDRESS).with_balance_failure("rpc timeout"));

        let notified = connector.connect().await.unwrap();

        assert_eq!(notified, Some(ADDRESS.to_string()));
        assert_eq!(connector.balance(), Some(&BalanceState::Unavailable));
        assert_eq!(connector.notices(), [BALANCE_NOTICE.to_string()]);
    }

    #[tokio::test]
    async fn taken_notices_are_not_repeated_across_reconnects() {
        let mut connector =
            connector(SimulatedWallet::new(ADDRESS).with_balance_failure("rpc timeout"));

        connector.connect().await.unwrap();
        assert_eq!(connector.take_notices(), vec![BALANCE_NOTICE.to_string()]);
        assert!(connector.notices().is_empty());

        for _ in 0..3 {
            connector.disconnect().await.unwrap();
            connector.connect().await.unwrap();
            assert_eq!(connector.take_notices(), vec![BALANCE_NOTICE.to_string()]);
        }
        assert!(connector.take_notices().is_empty());
    }

    #[tokio::test]
    async fn rejected_connection_returns_to_disconnected() {
        let mut connector = connector(SimulatedWallet::new(ADDRESS).rejecting("user closed"));

        let result = connector.connect().await;

        assert_eq!(
            result,
            Err(WalletError::ConnectionRejected("user closed".to_string()))
        );
        assert_eq!(connector.state(), &ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn disconnect_resets_and_allows_new_notification() {
        let mut connector = connector(SimulatedWallet::new(ADDRESS).with_balance(1));
        connector.connect().await.unwrap();

        connector.disconnect().await.unwrap();
        assert_eq!(connector.state(), &ConnectionState::Disconnected);
        assert_eq!(connector.balance(), None);

        let again = connector.connect().await.unwrap();
        assert_eq!(again, Some(ADDRESS.to_string()));
        assert_eq!(connector.adapter().balance_requests(), 2);
    }

    #[tokio::test]
    async fn adapter_side_disconnect_is_picked_up_by_sync() {
        let mut connector = connector(SimulatedWallet::new(ADDRESS));
        connector.connect().await.unwrap();

        connector.adapter_mut().sever();
        let result = connector.sync().await;

        assert_eq!(result, None);
        assert_eq!(connector.state(), &ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn connected_state_records_address_and_time() {
        let before = Utc::now();
        let mut connector = connector(SimulatedWallet::new(ADDRESS));

        connector.connect().await.unwrap();

        match connector.state() {
            ConnectionState::Connected {
                address,
                connected_at,
                ..
            } => {
                assert_eq!(address, ADDRESS);
                assert!(*connected_at >= before);
            }
            other => panic!("expected Connected, got {other:?}"),
        }
    }

    #[test]
    fn short_address_keeps_edges() {
        assert_eq!(short_address(ADDRESS), "7xKX...gAsU");
        assert_eq!(short_address("ADDR1"), "ADDR1");
    }
}
