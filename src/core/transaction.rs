// UTXO-model transactions: inputs consume whole previous outputs, outputs
// create new spendable entries. All inputs of one transaction are signed by
// one key, with a single signature over the signing hash stamped onto each.

use crate::error::{BlockchainError, Result};
use crate::storage::UtxoSet;
use crate::utils::{
    ecdsa_secp256k1_sign_digest, ecdsa_secp256k1_verify, hex_decode, serialize, sha256_hex,
};
use crate::wallet::{address_of, public_key_of, validate_address};
use serde::{Deserialize, Serialize};

/// Version byte prefixed to every hashed transaction encoding. Bump it and
/// old signatures/txids stop matching, which is the point.
const TX_ENCODING_VERSION: u8 = 1;

/// A reference to a prior output, plus proof of ownership once signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
#[serde(rename_all = "camelCase")]
pub struct TxInput {
    txid: String,
    vout: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_key: Option<String>,
}

impl TxInput {
    pub fn new(txid: &str, vout: usize) -> TxInput {
        TxInput {
            txid: txid.to_string(),
            vout,
            signature: None,
            public_key: None,
        }
    }

    pub fn get_txid(&self) -> &str {
        self.txid.as_str()
    }

    pub fn get_vout(&self) -> usize {
        self.vout
    }

    pub fn get_signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn get_public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }
}

/// Value locked to an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
#[serde(rename_all = "camelCase")]
pub struct TxOutput {
    address: String,
    value: u64,
}

impl TxOutput {
    pub fn new(address: &str, value: u64) -> Result<TxOutput> {
        if !validate_address(address) {
            return Err(BlockchainError::Structural(format!(
                "Invalid output address: {address}"
            )));
        }
        Ok(TxOutput {
            address: address.to_string(),
            value,
        })
    }

    pub fn get_address(&self) -> &str {
        self.address.as_str()
    }

    pub fn get_value(&self) -> u64 {
        self.value
    }
}

/// Canonical encoding of the signable portion of a transaction: inputs as
/// (txid, vout) and outputs as (address, value), signature fields excluded so
/// the hash stays stable across the sign step.
#[derive(Serialize, bincode::Encode)]
struct SigningPayload {
    version: u8,
    inputs: Vec<(String, u64)>,
    outputs: Vec<(String, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: String,
    vin: Vec<TxInput>,
    vout: Vec<TxOutput>,
}

impl Transaction {
    /// Build a transaction from explicit inputs and outputs; the id is the
    /// content hash of the (still unsigned) transaction.
    pub fn new(vin: Vec<TxInput>, vout: Vec<TxOutput>) -> Result<Transaction> {
        let mut tx = Transaction {
            id: String::new(),
            vin,
            vout,
        };
        tx.id = tx.hash()?;
        Ok(tx)
    }

    /// A coinbase transaction creates new value: no inputs, one output paying
    /// the reward to the miner.
    pub fn new_coinbase(to: &str, reward: u64) -> Result<Transaction> {
        let txout = TxOutput::new(to, reward)?;
        Transaction::new(vec![], vec![txout])
    }

    /// Build an unsigned transfer funded from `from`'s unspent outputs, with
    /// change returned to the sender. Call [`Transaction::sign_all_inputs`]
    /// before submitting it.
    pub fn new_transfer(
        from: &str,
        to: &str,
        amount: u64,
        utxo_set: &UtxoSet,
    ) -> Result<Transaction> {
        if amount == 0 {
            return Err(BlockchainError::Structural(
                "Amount must be positive".to_string(),
            ));
        }
        if !validate_address(from) {
            return Err(BlockchainError::Structural(format!(
                "Invalid from address: {from}"
            )));
        }
        if !validate_address(to) {
            return Err(BlockchainError::Structural(format!(
                "Invalid to address: {to}"
            )));
        }

        let mut accumulated = 0u64;
        let mut inputs = vec![];
        for record in utxo_set.utxos_of(from) {
            if accumulated >= amount {
                break;
            }
            accumulated += record.value;
            inputs.push(TxInput::new(&record.txid, record.vout));
        }

        if accumulated < amount {
            return Err(BlockchainError::InsufficientFunds {
                required: amount,
                available: utxo_set.balance_of(from),
            });
        }

        let mut outputs = vec![TxOutput::new(to, amount)?];
        let change = accumulated - amount;
        if change > 0 {
            outputs.push(TxOutput::new(from, change)?);
        }

        Transaction::new(inputs, outputs)
    }

    /// Hash a signature commits to: inputs by reference, outputs by value,
    /// never the signature fields themselves.
    pub fn signing_hash(&self) -> Result<String> {
        let payload = SigningPayload {
            version: TX_ENCODING_VERSION,
            inputs: self
                .vin
                .iter()
                .map(|input| (input.txid.clone(), input.vout as u64))
                .collect(),
            outputs: self
                .vout
                .iter()
                .map(|output| (output.address.clone(), output.value))
                .collect(),
        };
        Ok(sha256_hex(serialize(&payload)?.as_slice()))
    }

    /// Content hash over the full transaction, signatures included. Two
    /// structurally identical unsigned transactions share a txid; they
    /// diverge once signed.
    pub fn hash(&self) -> Result<String> {
        let mut tx_copy = self.clone();
        tx_copy.id = String::new();
        Ok(sha256_hex(serialize(&tx_copy)?.as_slice()))
    }

    /// Sign every input with one key: a single ECDSA signature over the
    /// signing hash, stamped with the compressed public key onto each input.
    /// The id is recomputed afterwards since signatures feed into it.
    pub fn sign_all_inputs(&mut self, private_key_hex: &str) -> Result<()> {
        let digest = hex_decode(self.signing_hash()?.as_str())?;
        let signature = ecdsa_secp256k1_sign_digest(private_key_hex, digest.as_slice())?;
        let public_key = public_key_of(private_key_hex)?;

        for input in self.vin.iter_mut() {
            input.signature = Some(signature.clone());
            input.public_key = Some(public_key.clone());
        }
        self.id = self.hash()?;
        Ok(())
    }

    /// Check every input against the ledger: the referenced output must
    /// exist, the embedded key must derive the output's owner, and the
    /// signature must verify over the signing hash. Read-only.
    pub fn verify_all_inputs(&self, utxo_set: &UtxoSet) -> Result<()> {
        let digest = hex_decode(self.signing_hash()?.as_str())?;

        for (index, input) in self.vin.iter().enumerate() {
            let utxo = utxo_set.get(&input.txid, input.vout).ok_or_else(|| {
                BlockchainError::UtxoNotFound {
                    txid: input.txid.clone(),
                    vout: input.vout,
                }
            })?;

            let public_key = input.public_key.as_deref().ok_or_else(|| {
                BlockchainError::InvalidSignature(format!("Input {index} has no public key"))
            })?;
            let derived = address_of(public_key)?;
            if derived != utxo.address {
                return Err(BlockchainError::OwnerMismatch {
                    expected: utxo.address.clone(),
                    derived,
                });
            }

            let signature = input
                .signature
                .as_deref()
                .ok_or(BlockchainError::MissingSignature { input: index })?;
            if !ecdsa_secp256k1_verify(public_key, signature, digest.as_slice()) {
                return Err(BlockchainError::InvalidSignature(format!(
                    "Input {index} failed signature verification"
                )));
            }
        }
        Ok(())
    }

    pub fn is_coinbase(&self) -> bool {
        self.vin.is_empty()
    }

    pub fn get_id(&self) -> &str {
        self.id.as_str()
    }

    pub fn get_vin(&self) -> &[TxInput] {
        self.vin.as_slice()
    }

    pub fn get_vout(&self) -> &[TxOutput] {
        self.vout.as_slice()
    }

    /// Sum of output values.
    pub fn total_value(&self) -> u64 {
        self.vout.iter().map(|output| output.value).sum()
    }
}
