//! In-memory stand-ins for the fact provider, completion model and chain

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use oracle_chain::{Address, ChainGateway, ContractCall, TxHash};
use oracle_core::{OnChainPrediction, OracleError, OracleResult, Outcome, UserStats};
use oracle_research::{CompletionModel, FactProvider};

pub const THREE_PREDICTIONS: &str = r#"[
    {"description": "Will the Fed cut rates in June?", "duration": 5184000, "tags": ["economy", "fed", "rates"]},
    {"description": "Will US CPI YoY print below 3% in May?", "duration": 3888000, "tags": ["economy", "inflation", "cpi"]},
    {"description": "Will the S&P 500 close above 6000 on June 30?", "duration": 6048000, "tags": ["markets", "stocks", "sp500"]}
]"#;

#[derive(Default)]
pub struct FakeFacts {
    pub queries: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl FactProvider for FakeFacts {
    async fn fetch_digest(&self, query: &str) -> OracleResult<String> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(OracleError::retrieval("Perplexity API error (503): unavailable"));
        }
        Ok(format!("Latest facts about {}", query))
    }
}

/// Answers completions from a queue, in call order.
#[derive(Default)]
pub struct QueuedModel {
    answers: Mutex<VecDeque<String>>,
}

impl QueuedModel {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
        }
    }
}

#[async_trait]
impl CompletionModel for QueuedModel {
    async fn complete(&self, _system: &str, _user: &str, _temperature: f32) -> OracleResult<String> {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| OracleError::internal("no scripted answer left"))
    }
}

pub struct FakeChain {
    pub chain_count: AtomicU64,
    pub count_reads: AtomicU64,
    /// 1-based send attempts that the node rejects, with the rejection message
    pub reject_sends: Mutex<Vec<(usize, String)>>,
    pub reverted: Mutex<HashSet<TxHash>>,
    pub sent: Mutex<Vec<(ContractCall, u64)>>,
    pub confirmed: Mutex<Vec<TxHash>>,
    pub stored: Mutex<Option<OnChainPrediction>>,
}

impl FakeChain {
    pub fn new(chain_count: u64) -> Arc<Self> {
        Arc::new(Self {
            chain_count: AtomicU64::new(chain_count),
            count_reads: AtomicU64::new(0),
            reject_sends: Mutex::new(Vec::new()),
            reverted: Mutex::new(HashSet::new()),
            sent: Mutex::new(Vec::new()),
            confirmed: Mutex::new(Vec::new()),
            stored: Mutex::new(None),
        })
    }

    pub fn reject_send(&self, attempt: usize, message: &str) {
        self.reject_sends
            .lock()
            .unwrap()
            .push((attempt, message.to_string()));
    }

    pub fn store(&self, description: &str) {
        *self.stored.lock().unwrap() = Some(OnChainPrediction {
            description: description.to_string(),
            duration: 86_400,
            min_votes: 1,
            max_votes: 1000,
            prediction_type: 0,
            options_count: 2,
            tags: vec!["a".into(), "b".into(), "c".into()],
            is_finalized: false,
            outcome: None,
        });
    }

    pub fn sent_calls(&self) -> Vec<(ContractCall, u64)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn hash_for(nonce: u64) -> TxHash {
        TxHash::with_last_byte(nonce as u8)
    }
}

#[async_trait]
impl ChainGateway for FakeChain {
    fn signer_address(&self) -> Address {
        Address::with_last_byte(0xaa)
    }

    async fn transaction_count(&self) -> OracleResult<u64> {
        self.count_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.chain_count.load(Ordering::SeqCst))
    }

    async fn send(&self, call: &ContractCall, nonce: u64) -> OracleResult<TxHash> {
        let attempt = {
            let mut sent = self.sent.lock().unwrap();
            sent.push((call.clone(), nonce));
            sent.len()
        };

        let rejection = self
            .reject_sends
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| *n == attempt)
            .map(|(_, message)| message.clone());

        match rejection {
            Some(message) => Err(OracleError::rpc(message)),
            None => Ok(Self::hash_for(nonce)),
        }
    }

    async fn confirm(&self, tx_hash: TxHash) -> OracleResult<()> {
        if self.reverted.lock().unwrap().contains(&tx_hash) {
            return Err(OracleError::confirmation(format!("transaction {} reverted", tx_hash)));
        }
        self.confirmed.lock().unwrap().push(tx_hash);
        Ok(())
    }

    async fn prediction_details(&self, prediction_id: u64) -> OracleResult<OnChainPrediction> {
        self.stored
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| OracleError::contract_read(format!("prediction {} not found", prediction_id)))
    }

    async fn user_stats(&self, _user: Address) -> OracleResult<UserStats> {
        Ok(UserStats {
            total_votes: 12,
            correct_votes: 9,
            reputation: 75,
        })
    }
}

pub fn finalize_outcome(call: &ContractCall) -> Option<Outcome> {
    match call {
        ContractCall::FinalizePrediction { outcome, .. } => Some(*outcome),
        _ => None,
    }
}
