use async_trait::async_trait;
use mockall::automock;
use serde_json::json;
use solana_client::{
    nonblocking::rpc_client::RpcClient, rpc_client::GetConfirmedSignaturesForAddress2Config,
    rpc_config::RpcTransactionConfig, rpc_request::RpcRequest,
};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature};
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding};
use std::{str::FromStr, time::Duration};

use crate::{
    instruction::{SignatureRecord, TransactionDetail},
    Error, Result,
};

/// The RPC operations the scanner depends on.
#[automock]
#[async_trait]
pub trait ScannerClient: Send + Sync {
    /// Current slot. Used as the liveness check.
    async fn get_slot(&self) -> Result<u64>;

    /// Up to `limit` most recent signatures that reference `address`, in the
    /// order the node returns them.
    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>>;

    /// Full transaction at `confirmed` commitment, or `None` when the node does
    /// not know the signature.
    async fn get_transaction(&self, signature: &str) -> Result<Option<TransactionDetail>>;
}

pub struct RpcScannerClient {
    client: RpcClient,
}

impl RpcScannerClient {
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed()),
        }
    }

    pub fn new_with_timeout(rpc_url: String, timeout: Duration) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(
                rpc_url,
                timeout,
                CommitmentConfig::confirmed(),
            ),
        }
    }

    /// Wraps an already configured client. Its commitment is ignored, requests
    /// always ask for `confirmed`.
    pub fn from_rpc_client(client: RpcClient) -> Self {
        Self { client }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

#[async_trait]
impl ScannerClient for RpcScannerClient {
    async fn get_slot(&self) -> Result<u64> {
        Ok(self.client.get_slot().await?)
    }

    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>> {
        let config = GetConfirmedSignaturesForAddress2Config {
            before: None,
            until: None,
            limit: Some(limit),
            commitment: Some(CommitmentConfig::confirmed()),
        };

        let statuses = self
            .client
            .get_signatures_for_address_with_config(address, config)
            .await?;

        Ok(statuses.into_iter().map(SignatureRecord::from).collect())
    }

    async fn get_transaction(&self, signature: &str) -> Result<Option<TransactionDetail>> {
        let parsed = Signature::from_str(signature).map_err(|e| Error::InvalidSignature {
            signature: signature.to_string(),
            reason: e.to_string(),
        })?;

        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Base64),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };

        // `get_transaction_with_config` turns a null result into a decode
        // error, so the raw request is used to keep "not found" distinct.
        let response: Option<EncodedConfirmedTransactionWithStatusMeta> = self
            .client
            .send(
                RpcRequest::GetTransaction,
                json!([parsed.to_string(), config]),
            )
            .await?;

        response
            .map(|encoded| TransactionDetail::from_encoded(signature, encoded))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine};
    use serde_json::Value;
    use solana_sdk::{
        instruction::CompiledInstruction,
        message::{v0, MessageHeader, VersionedMessage},
        transaction::VersionedTransaction,
    };
    use std::collections::HashMap;

    fn mock_client(mocks: HashMap<RpcRequest, Value>) -> RpcScannerClient {
        RpcScannerClient::from_rpc_client(RpcClient::new_mock_with_mocks(
            "succeeds".to_string(),
            mocks,
        ))
    }

    #[tokio::test]
    async fn test_get_transaction_null_result_is_none() {
        let client = mock_client(HashMap::from([(
            RpcRequest::GetTransaction,
            Value::Null,
        )]));

        let res = client
            .get_transaction(&Signature::from([1; 64]).to_string())
            .await
            .unwrap();
        assert_eq!(res, None);
    }

    #[tokio::test]
    async fn test_get_transaction_decodes_base64_v0_payload() {
        let payer = Pubkey::new_unique();
        let program = Pubkey::new_unique();
        let loaded_writable = Pubkey::new_unique();
        let loaded_readonly = Pubkey::new_unique();

        let transaction = VersionedTransaction {
            signatures: vec![Signature::from([2; 64])],
            message: VersionedMessage::V0(v0::Message {
                header: MessageHeader {
                    num_required_signatures: 1,
                    num_readonly_signed_accounts: 0,
                    num_readonly_unsigned_accounts: 1,
                },
                account_keys: vec![payer, program],
                instructions: vec![CompiledInstruction::new_from_raw_parts(
                    1,
                    vec![9, 8, 7],
                    vec![0, 2, 3],
                )],
                ..v0::Message::default()
            }),
        };
        let bytes =
            bincode::serde::encode_to_vec(&transaction, bincode::config::legacy()).unwrap();
        let payload = general_purpose::STANDARD.encode(bytes);

        let response = json!({
            "slot": 77,
            "blockTime": 1_700_000_000,
            "transaction": [payload, "base64"],
            "meta": {
                "err": null,
                "status": { "Ok": null },
                "fee": 5000,
                "preBalances": [],
                "postBalances": [],
                "loadedAddresses": {
                    "writable": [loaded_writable.to_string()],
                    "readonly": [loaded_readonly.to_string()],
                },
            },
            "version": 0,
        });
        let client = mock_client(HashMap::from([(RpcRequest::GetTransaction, response)]));

        let signature = Signature::from([2; 64]).to_string();
        let detail = client.get_transaction(&signature).await.unwrap().unwrap();

        assert_eq!(detail.signature, signature);
        assert_eq!(detail.slot, 77);
        assert_eq!(detail.block_time, Some(1_700_000_000));
        assert_eq!(detail.instructions.len(), 1);
        assert_eq!(detail.instructions[0].program_id, program);
        assert_eq!(
            detail.instructions[0].accounts,
            vec![payer, loaded_writable, loaded_readonly]
        );
        assert_eq!(detail.instructions[0].data, vec![9, 8, 7]);
    }

    #[tokio::test]
    async fn test_get_slot_through_rpc() {
        let client = mock_client(HashMap::from([(RpcRequest::GetSlot, json!(321))]));
        assert_eq!(client.get_slot().await.unwrap(), 321);
    }

    #[tokio::test]
    async fn test_rpc_failure_maps_to_rpc_error() {
        let client = RpcScannerClient::from_rpc_client(RpcClient::new_mock("fails".to_string()));
        assert!(matches!(client.get_slot().await, Err(Error::Rpc(_))));
    }

    #[tokio::test]
    async fn test_get_transaction_rejects_malformed_signature() {
        // No request is sent, so the endpoint does not need to exist.
        let client = RpcScannerClient::new("http://127.0.0.1:1".to_string());

        let res = client.get_transaction("not-a-signature").await;
        assert!(matches!(
            res,
            Err(Error::InvalidSignature { signature, .. }) if signature == "not-a-signature"
        ));
    }

    #[test]
    fn test_url() {
        let client = RpcScannerClient::new_with_timeout(
            "http://localhost:8899".to_string(),
            Duration::from_secs(5),
        );
        assert_eq!(client.url(), "http://localhost:8899");
    }
}
