//! Typed views of the RPC responses the scanner consumes.

use serde::{Serialize, Serializer};
use solana_rpc_client_api::response::RpcConfirmedTransactionStatusWithSignature;
use solana_sdk::{message::VersionedMessage, pubkey::Pubkey};
use solana_transaction_status::{
    option_serializer::OptionSerializer, EncodedConfirmedTransactionWithStatusMeta,
};
use std::{fmt, str::FromStr};
use tracing::debug;

use crate::{Error, Result};

/// One entry of a `getSignaturesForAddress` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRecord {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub failed: bool,
}

impl From<RpcConfirmedTransactionStatusWithSignature> for SignatureRecord {
    fn from(status: RpcConfirmedTransactionStatusWithSignature) -> Self {
        Self {
            signature: status.signature,
            slot: status.slot,
            block_time: status.block_time,
            failed: status.err.is_some(),
        }
    }
}

/// A top-level instruction with its program and account indices resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInstruction {
    #[serde(serialize_with = "serialize_pubkey")]
    pub program_id: Pubkey,
    #[serde(serialize_with = "serialize_pubkeys")]
    pub accounts: Vec<Pubkey>,
    #[serde(serialize_with = "serialize_base58")]
    pub data: Vec<u8>,
}

impl fmt::Display for RawInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

fn serialize_pubkey<S: Serializer>(
    pubkey: &Pubkey,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(pubkey)
}

fn serialize_pubkeys<S: Serializer>(
    pubkeys: &[Pubkey],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(pubkeys.iter().map(Pubkey::to_string))
}

fn serialize_base58<S: Serializer>(
    data: &[u8],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&bs58::encode(data).into_string())
}

/// A fetched transaction. Only the pieces the scanner inspects are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDetail {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub instructions: Vec<RawInstruction>,
}

impl TransactionDetail {
    /// Decodes a binary-encoded `getTransaction` result.
    pub fn from_encoded(
        signature: &str,
        encoded: EncodedConfirmedTransactionWithStatusMeta,
    ) -> Result<Self> {
        let EncodedConfirmedTransactionWithStatusMeta {
            slot,
            transaction,
            block_time,
        } = encoded;

        let versioned = transaction.transaction.decode().ok_or_else(|| Error::Decode {
            signature: signature.to_string(),
            reason: "transaction payload is not a decodable binary encoding".to_string(),
        })?;

        let loaded = match transaction.meta.as_ref().map(|meta| &meta.loaded_addresses) {
            Some(OptionSerializer::Some(addresses)) => {
                loaded_addresses(signature, &addresses.writable, &addresses.readonly)?
            }
            _ => Vec::new(),
        };

        Ok(Self {
            signature: signature.to_string(),
            slot,
            block_time,
            instructions: extract_instructions(&versioned.message, &loaded),
        })
    }
}

fn loaded_addresses(
    signature: &str,
    writable: &[String],
    readonly: &[String],
) -> Result<Vec<Pubkey>> {
    writable
        .iter()
        .chain(readonly.iter())
        .map(|address| {
            Pubkey::from_str(address).map_err(|e| Error::Decode {
                signature: signature.to_string(),
                reason: format!("invalid loaded address {address}: {e}"),
            })
        })
        .collect()
}

/// Resolves the top-level instructions of `message`. `loaded` holds the
/// addresses pulled in through lookup tables, writable ones first, so that
/// indices past the static keys still resolve.
///
/// Instructions whose program index is out of range are dropped, as are
/// account indices that cannot be resolved.
pub fn extract_instructions(
    message: &VersionedMessage,
    loaded: &[Pubkey],
) -> Vec<RawInstruction> {
    let static_keys = message.static_account_keys();
    let resolve = |index: u8| -> Option<Pubkey> {
        let index = index as usize;
        static_keys
            .get(index)
            .or_else(|| loaded.get(index.checked_sub(static_keys.len())?))
            .copied()
    };

    message
        .instructions()
        .iter()
        .filter_map(|ix| {
            let Some(program_id) = resolve(ix.program_id_index) else {
                debug!(
                    "Skipping instruction with unresolvable program index {}",
                    ix.program_id_index
                );
                return None;
            };

            Some(RawInstruction {
                program_id,
                accounts: ix.accounts.iter().filter_map(|&i| resolve(i)).collect(),
                data: ix.data.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        instruction::{AccountMeta, CompiledInstruction, Instruction},
        message::{v0, Message, MessageHeader},
    };
    use solana_transaction_status::{EncodedTransaction, EncodedTransactionWithStatusMeta};

    #[test]
    fn test_extract_legacy_instructions() {
        let payer = Pubkey::new_unique();
        let program = Pubkey::new_unique();
        let other_program = Pubkey::new_unique();
        let pool = Pubkey::new_unique();

        let message = Message::new(
            &[
                Instruction::new_with_bytes(
                    program,
                    &[1, 2, 3],
                    vec![AccountMeta::new(pool, false)],
                ),
                Instruction::new_with_bytes(other_program, &[9], vec![]),
            ],
            Some(&payer),
        );

        let instructions = extract_instructions(&VersionedMessage::Legacy(message), &[]);

        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[0].program_id, program);
        assert_eq!(instructions[0].accounts, vec![pool]);
        assert_eq!(instructions[0].data, vec![1, 2, 3]);
        assert_eq!(instructions[1].program_id, other_program);
        assert!(instructions[1].accounts.is_empty());
    }

    #[test]
    fn test_extract_resolves_lookup_table_accounts() {
        let payer = Pubkey::new_unique();
        let program = Pubkey::new_unique();
        let loaded_writable = Pubkey::new_unique();
        let loaded_readonly = Pubkey::new_unique();

        let message = v0::Message {
            header: MessageHeader {
                num_required_signatures: 1,
                num_readonly_signed_accounts: 0,
                num_readonly_unsigned_accounts: 1,
            },
            account_keys: vec![payer, program],
            instructions: vec![CompiledInstruction::new_from_raw_parts(1, vec![7], vec![0, 2, 3])],
            ..v0::Message::default()
        };

        let instructions = extract_instructions(
            &VersionedMessage::V0(message),
            &[loaded_writable, loaded_readonly],
        );

        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].program_id, program);
        assert_eq!(
            instructions[0].accounts,
            vec![payer, loaded_writable, loaded_readonly]
        );
    }

    #[test]
    fn test_extract_tolerates_out_of_range_indices() {
        let payer = Pubkey::new_unique();
        let program = Pubkey::new_unique();

        let message = v0::Message {
            account_keys: vec![payer, program],
            instructions: vec![
                CompiledInstruction::new_from_raw_parts(9, vec![], vec![0]),
                CompiledInstruction::new_from_raw_parts(1, vec![], vec![0, 42]),
            ],
            ..v0::Message::default()
        };

        let instructions = extract_instructions(&VersionedMessage::V0(message), &[]);

        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].program_id, program);
        assert_eq!(instructions[0].accounts, vec![payer]);
    }

    #[test]
    fn test_raw_instruction_json() {
        let program_id = Pubkey::new_from_array([1; 32]);
        let account = Pubkey::new_from_array([2; 32]);
        let ix = RawInstruction {
            program_id,
            accounts: vec![account],
            data: vec![0, 1, 2],
        };

        let value: serde_json::Value = serde_json::from_str(&ix.to_string()).unwrap();
        assert_eq!(value["programId"], program_id.to_string());
        assert_eq!(value["accounts"][0], account.to_string());
        assert_eq!(value["data"], bs58::encode([0u8, 1, 2]).into_string());
    }

    #[test]
    fn test_signature_record_from_rpc_status() {
        let status = RpcConfirmedTransactionStatusWithSignature {
            signature: "sig".to_string(),
            slot: 42,
            err: None,
            memo: None,
            block_time: Some(1_700_000_000),
            confirmation_status: None,
        };

        let record = SignatureRecord::from(status);
        assert_eq!(record.signature, "sig");
        assert_eq!(record.slot, 42);
        assert_eq!(record.block_time, Some(1_700_000_000));
        assert!(!record.failed);
    }

    #[test]
    fn test_undecodable_payload_is_an_error() {
        let encoded = EncodedConfirmedTransactionWithStatusMeta {
            slot: 1,
            transaction: EncodedTransactionWithStatusMeta {
                transaction: EncodedTransaction::LegacyBinary("0OIl".to_string()),
                meta: None,
                version: None,
            },
            block_time: None,
        };

        let res = TransactionDetail::from_encoded("s1", encoded);
        assert!(matches!(res, Err(Error::Decode { signature, .. }) if signature == "s1"));
    }
}
