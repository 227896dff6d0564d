//! Scripted wallet-provider double for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::abi::CallData;
use crate::provider::{ProviderError, TransactionRequest, WalletProvider};

/// A `WalletProvider` that answers from pre-scripted queues, in order.
///
/// Read-only calls and transactions consume separate queues; an exhausted
/// queue yields an `InvalidReply` error so a test that under-scripts fails
/// visibly instead of hanging.
pub(crate) struct ScriptedProvider {
    accounts: Vec<Address>,
    call_replies: Mutex<VecDeque<Result<String, String>>>,
    tx_replies: Mutex<VecDeque<Result<String, String>>>,
    sent: Mutex<Vec<TransactionRequest>>,
}

impl ScriptedProvider {
    pub fn with_payer(payer: Address) -> Self {
        Self {
            accounts: vec![payer],
            call_replies: Mutex::new(VecDeque::new()),
            tx_replies: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Script an `eth_call` reply of one uint256 word.
    pub fn call_reply(self, value: U256) -> Self {
        let word = format!("{value:x}");
        self.raw_call_reply(format!("0x{word:0>64}"))
    }

    pub fn raw_call_reply(self, reply: String) -> Self {
        if let Ok(mut queue) = self.call_replies.lock() {
            queue.push_back(Ok(reply));
        }
        self
    }

    pub fn failing_call(self, message: &str) -> Self {
        if let Ok(mut queue) = self.call_replies.lock() {
            queue.push_back(Err(message.to_string()));
        }
        self
    }

    /// Script a successful `eth_sendTransaction` reply.
    pub fn tx_hash(self, hash: &str) -> Self {
        if let Ok(mut queue) = self.tx_replies.lock() {
            queue.push_back(Ok(hash.to_string()));
        }
        self
    }

    pub fn failing_tx(self, message: &str) -> Self {
        if let Ok(mut queue) = self.tx_replies.lock() {
            queue.push_back(Err(message.to_string()));
        }
        self
    }

    /// Transactions submitted so far, in submission order.
    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    fn pop(queue: &Mutex<VecDeque<Result<String, String>>>) -> Result<String, ProviderError> {
        let scripted = queue
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .ok_or_else(|| ProviderError::InvalidReply("script exhausted".to_string()))?;
        scripted.map_err(|message| ProviderError::Rpc {
            code: -32000,
            message,
        })
    }
}

#[async_trait]
impl WalletProvider for ScriptedProvider {
    async fn request_access(&self) -> Result<Vec<Address>, ProviderError> {
        if self.accounts.is_empty() {
            return Err(ProviderError::NoAccounts);
        }
        Ok(self.accounts.clone())
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        Ok("0x1".to_string())
    }

    async fn call(&self, _to: Address, _data: &CallData) -> Result<String, ProviderError> {
        Self::pop(&self.call_replies)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<String, ProviderError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(tx);
        }
        Self::pop(&self.tx_replies)
    }
}
