//! Transaction sequencing for the signing identity
//!
//! Every contract write is signed by one wallet, so every write needs the next
//! unused nonce. [`NonceManager`] owns that counter behind an async mutex;
//! [`TransactionSequencer`] holds a lease on it from nonce lookup until the
//! node accepts the transaction, so concurrent submissions get consecutive
//! nonces in the order they reach the lock.
//!
//! The counter is initialized lazily from the chain, advanced as soon as a
//! transaction is accepted for broadcast (not when it confirms), and dropped
//! back to uninitialized whenever the node reports the nonce as stale.

use std::future::Future;
use std::sync::Arc;

use alloy::primitives::TxHash;
use oracle_core::{OracleError, OracleResult};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use crate::contract::ContractCall;
use crate::gateway::ChainGateway;

/// Node error fragments that mean the nonce was already used or is out of order
const STALE_SEQUENCE_MARKERS: &[&str] = &[
    "nonce too low",
    "nonce has already been used",
    "invalid nonce",
    "nonce expired",
    "already known",
    "replacement transaction underpriced",
];

/// True when a node error message reports a stale sequence number.
pub fn is_stale_sequence_message(message: &str) -> bool {
    let message = message.to_lowercase();
    STALE_SEQUENCE_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Process-wide next-nonce counter
#[derive(Debug, Default)]
pub struct NonceManager {
    next: Mutex<Option<u64>>,
}

impl NonceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current next nonce, or `None` if it has not been fetched yet
    pub async fn peek(&self) -> Option<u64> {
        *self.next.lock().await
    }

    /// Take exclusive use of the next nonce.
    ///
    /// When the counter is uninitialized `fetch` is called to read it from
    /// the chain. The lock is held until the lease is committed, reset, or
    /// dropped, so only one caller ever performs that read.
    pub async fn allocate<F, Fut>(&self, fetch: F) -> OracleResult<NonceLease<'_>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = OracleResult<u64>>,
    {
        let mut guard = self.next.lock().await;

        let nonce = match *guard {
            Some(nonce) => nonce,
            None => {
                let nonce = fetch().await?;
                info!("Initialized nonce from chain: {}", nonce);
                *guard = Some(nonce);
                nonce
            }
        };

        Ok(NonceLease { guard, nonce })
    }

    /// Forget the cached nonce so the next allocation re-reads the chain.
    pub async fn reset(&self) {
        *self.next.lock().await = None;
    }
}

/// Exclusive hold on the next nonce
///
/// Dropping the lease without committing leaves the nonce unused.
pub struct NonceLease<'a> {
    guard: MutexGuard<'a, Option<u64>>,
    nonce: u64,
}

impl NonceLease<'_> {
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The transaction was accepted; advance past this nonce.
    pub fn commit(mut self) {
        *self.guard = Some(self.nonce + 1);
    }

    /// The chain rejected this nonce as stale; forget the cached value.
    pub fn report_stale_and_reset(mut self) {
        *self.guard = None;
    }
}

/// A transaction accepted for broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub tx_hash: TxHash,
    pub nonce: u64,
}

/// Serializes contract writes from the signing identity
pub struct TransactionSequencer {
    gateway: Arc<dyn ChainGateway>,
    nonces: NonceManager,
}

impl TransactionSequencer {
    pub fn new(gateway: Arc<dyn ChainGateway>) -> Self {
        Self {
            gateway,
            nonces: NonceManager::new(),
        }
    }

    /// Next nonce this sequencer will use, if known
    pub async fn pending_nonce(&self) -> Option<u64> {
        self.nonces.peek().await
    }

    pub async fn reset(&self) {
        self.nonces.reset().await;
    }

    /// Submit a contract write with the next nonce.
    ///
    /// Returns as soon as the node accepts the transaction; confirmation is
    /// left to the caller. A stale-nonce rejection resets the counter and is
    /// returned as [`OracleError::StaleSequence`]; no submission is retried.
    #[instrument(skip(self, call), fields(method = call.method()))]
    pub async fn submit(&self, call: &ContractCall) -> OracleResult<Submission> {
        let lease = self
            .nonces
            .allocate(|| async {
                self.gateway.transaction_count().await.map_err(|e| {
                    OracleError::sequencing(format!("failed to read transaction count: {}", e))
                })
            })
            .await?;

        let nonce = lease.nonce();
        debug!("Submitting {} with nonce {}", call.method(), nonce);

        match self.gateway.send(call, nonce).await {
            Ok(tx_hash) => {
                lease.commit();
                info!("{} accepted: {} (nonce {})", call.method(), tx_hash, nonce);
                Ok(Submission { tx_hash, nonce })
            }
            Err(e) => {
                let message = e.to_string();
                if is_stale_sequence_message(&message) {
                    lease.report_stale_and_reset();
                    warn!("Nonce {} rejected as stale, resetting: {}", nonce, message);
                    Err(OracleError::stale_sequence(format!(
                        "{} with nonce {}: {}",
                        call.method(),
                        nonce,
                        message
                    )))
                } else {
                    warn!("{} rejected (nonce {} kept): {}", call.method(), nonce, message);
                    Err(OracleError::sequencing(format!(
                        "{} failed: {}",
                        call.method(),
                        message
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256};
    use async_trait::async_trait;
    use oracle_core::{OnChainPrediction, Outcome, UserStats};
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Chain fake: a settable transaction count and a queue of send results.
    struct FakeChain {
        chain_count: AtomicU64,
        count_reads: AtomicU64,
        send_script: StdMutex<VecDeque<Result<(), String>>>,
        sent_nonces: StdMutex<Vec<u64>>,
    }

    impl FakeChain {
        fn new(chain_count: u64) -> Arc<Self> {
            Arc::new(Self {
                chain_count: AtomicU64::new(chain_count),
                count_reads: AtomicU64::new(0),
                send_script: StdMutex::new(VecDeque::new()),
                sent_nonces: StdMutex::new(Vec::new()),
            })
        }

        fn fail_next_send(&self, message: &str) {
            self.send_script
                .lock()
                .unwrap()
                .push_back(Err(message.to_string()));
        }

        fn sent(&self) -> Vec<u64> {
            self.sent_nonces.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChainGateway for FakeChain {
        fn signer_address(&self) -> Address {
            Address::ZERO
        }

        async fn transaction_count(&self) -> OracleResult<u64> {
            self.count_reads.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(self.chain_count.load(Ordering::SeqCst))
        }

        async fn send(&self, _call: &ContractCall, nonce: u64) -> OracleResult<TxHash> {
            tokio::task::yield_now().await;
            self.sent_nonces.lock().unwrap().push(nonce);
            let scripted = self.send_script.lock().unwrap().pop_front();
            match scripted {
                Some(Err(message)) => Err(OracleError::rpc(message)),
                _ => Ok(B256::with_last_byte(nonce as u8)),
            }
        }

        async fn confirm(&self, _tx_hash: TxHash) -> OracleResult<()> {
            Ok(())
        }

        async fn prediction_details(&self, _prediction_id: u64) -> OracleResult<OnChainPrediction> {
            Err(OracleError::contract_read("not used"))
        }

        async fn user_stats(&self, _user: Address) -> OracleResult<UserStats> {
            Err(OracleError::contract_read("not used"))
        }
    }

    fn finalize_call(id: u64) -> ContractCall {
        ContractCall::FinalizePrediction {
            prediction_id: id,
            outcome: Outcome::No,
        }
    }

    #[test]
    fn test_stale_sequence_classification() {
        assert!(is_stale_sequence_message(
            "server returned an error response: error code -32000: nonce too low"
        ));
        assert!(is_stale_sequence_message("Nonce Too Low: next nonce 12, tx nonce 9"));
        assert!(is_stale_sequence_message("already known"));
        assert!(!is_stale_sequence_message("execution reverted: prediction already finalized"));
        assert!(!is_stale_sequence_message("insufficient funds for gas * price + value"));
    }

    #[tokio::test]
    async fn test_sequential_submissions_are_gap_free() {
        let chain = FakeChain::new(7);
        let sequencer = TransactionSequencer::new(chain.clone());

        assert_eq!(sequencer.pending_nonce().await, None);
        for id in 0..4 {
            let submission = sequencer.submit(&finalize_call(id)).await.unwrap();
            assert_eq!(submission.nonce, 7 + id);
        }

        assert_eq!(chain.sent(), vec![7, 8, 9, 10]);
        assert_eq!(chain.count_reads.load(Ordering::SeqCst), 1);
        assert_eq!(sequencer.pending_nonce().await, Some(11));
    }

    #[tokio::test]
    async fn test_concurrent_submissions_fetch_once() {
        let chain = FakeChain::new(20);
        let sequencer = TransactionSequencer::new(chain.clone());

        let (call1, call2, call3) = (finalize_call(1), finalize_call(2), finalize_call(3));
        let (a, b, c) = tokio::join!(
            sequencer.submit(&call1),
            sequencer.submit(&call2),
            sequencer.submit(&call3),
        );

        let mut nonces = vec![a.unwrap().nonce, b.unwrap().nonce, c.unwrap().nonce];
        nonces.sort_unstable();
        assert_eq!(nonces, vec![20, 21, 22]);
        assert_eq!(chain.count_reads.load(Ordering::SeqCst), 1);
        assert_eq!(chain.sent(), vec![20, 21, 22]);
    }

    #[tokio::test]
    async fn test_stale_rejection_resets_and_refetches() {
        let chain = FakeChain::new(3);
        let sequencer = TransactionSequencer::new(chain.clone());

        sequencer.submit(&finalize_call(1)).await.unwrap();
        assert_eq!(sequencer.pending_nonce().await, Some(4));

        // Another process used nonces 4 and 5 behind our back.
        chain.chain_count.store(6, Ordering::SeqCst);
        chain.fail_next_send("nonce too low: next nonce 6, tx nonce 4");

        let err = sequencer.submit(&finalize_call(2)).await.unwrap_err();
        assert!(err.is_stale_sequence());
        assert_eq!(sequencer.pending_nonce().await, None);

        let submission = sequencer.submit(&finalize_call(2)).await.unwrap();
        assert_eq!(submission.nonce, 6);
        assert_eq!(chain.count_reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_other_rejection_keeps_nonce() {
        let chain = FakeChain::new(10);
        let sequencer = TransactionSequencer::new(chain.clone());

        chain.fail_next_send("execution reverted: prediction already finalized");
        let err = sequencer.submit(&finalize_call(1)).await.unwrap_err();
        assert!(matches!(err, OracleError::Sequencing(_)));
        assert_eq!(sequencer.pending_nonce().await, Some(10));

        let submission = sequencer.submit(&finalize_call(2)).await.unwrap();
        assert_eq!(submission.nonce, 10);
        assert_eq!(chain.count_reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lease_dropped_without_commit() {
        let manager = NonceManager::new();

        let lease = manager.allocate(|| async { Ok(5) }).await.unwrap();
        assert_eq!(lease.nonce(), 5);
        drop(lease);
        assert_eq!(manager.peek().await, Some(5));

        manager.allocate(|| async { Ok(99) }).await.unwrap().commit();
        assert_eq!(manager.peek().await, Some(6));

        manager.reset().await;
        let lease = manager.allocate(|| async { Ok(40) }).await.unwrap();
        assert_eq!(lease.nonce(), 40);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_uninitialized() {
        let manager = NonceManager::new();
        let result = manager
            .allocate(|| async { Err(OracleError::rpc("connection refused")) })
            .await;
        assert!(result.is_err());
        assert_eq!(manager.peek().await, None);
    }
}
