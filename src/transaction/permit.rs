use crate::core::{
    abi,
    constants::{DAI_ADDRESS, MAINNET_CHAIN_ID, PERMIT_VALIDITY_BUFFER_SECS, UNI_ADDRESS},
    error::SwapResult,
    SwapError,
};
use ethabi::Token;
use ethers::providers::Middleware;
use ethers::types::{Address, U256};
use log::{debug, info};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;

/// Which message shape the token's permit implementation expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermitType {
    /// EIP-2612: the signature binds an exact approval amount.
    Amount,
    /// DAI-style: the signature flips a boolean allowance.
    Allowed,
}

/// Static descriptor for a permit-capable token.
#[derive(Debug, Clone)]
pub struct PermitInfo {
    pub permit_type: PermitType,
    pub name: &'static str,
    /// Some tokens carry a version field in their EIP-712 domain.
    pub version: Option<&'static str>,
}

lazy_static::lazy_static! {
    /// Per-chain allow-list of tokens known to support off-chain permits.
    /// Tokens absent here (with no override descriptor) disable the permit
    /// path entirely.
    pub static ref PERMITTABLE_TOKENS: HashMap<u64, HashMap<Address, PermitInfo>> = {
        let mut mainnet = HashMap::new();
        mainnet.insert(
            Address::from_str(DAI_ADDRESS).unwrap(),
            PermitInfo {
                permit_type: PermitType::Allowed,
                name: "Dai Stablecoin",
                version: Some("1"),
            },
        );
        mainnet.insert(
            Address::from_str(UNI_ADDRESS).unwrap(),
            PermitInfo {
                permit_type: PermitType::Amount,
                name: "Uniswap",
                version: None,
            },
        );

        let mut map = HashMap::new();
        map.insert(MAINNET_CHAIN_ID, mainnet);
        map
    };
}

/// A captured permit signature plus the full context it was produced
/// against. Any context drift invalidates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureData {
    pub v: u64,
    pub r: U256,
    pub s: U256,
    pub deadline: u64,
    pub nonce: U256,
    pub owner: Address,
    pub spender: Address,
    pub chain_id: u64,
    pub token_address: Address,
    pub permit_type: PermitType,
    /// Exact approval amount for amount-typed permits; `None` for the
    /// allowed-boolean style.
    pub amount: Option<U256>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermitState {
    NotApplicable,
    Loading,
    NotSigned,
    Signed,
}

/// Everything the signer needs to judge or produce a signature.
#[derive(Debug, Clone)]
pub struct PermitContext {
    pub owner: Address,
    pub token_address: Address,
    pub spender: Address,
    pub chain_id: u64,
    /// Approval amount currently required by the pending swap.
    pub required_amount: U256,
    /// Unix-seconds deadline of the transaction the permit accompanies.
    pub transaction_deadline: u64,
    /// On-chain permit nonce for the owner; `None` while unresolved.
    pub nonce: Option<U256>,
    /// Wallets of some types cannot produce off-chain signatures at all.
    pub wallet_supports_signing: bool,
    /// Descriptor for tokens not on the static allow-list.
    pub override_info: Option<PermitInfo>,
}

pub fn permit_info(
    chain_id: u64,
    token_address: Address,
    override_info: Option<&PermitInfo>,
) -> Option<PermitInfo> {
    if let Some(info) = override_info {
        return Some(info.clone());
    }
    PERMITTABLE_TOKENS
        .get(&chain_id)
        .and_then(|tokens| tokens.get(&token_address))
        .cloned()
}

/// A stored signature is only usable while every piece of its context
/// still matches and its deadline covers the current transaction deadline;
/// amount-typed permits additionally require an exact amount match.
fn signature_matches(signature: &SignatureData, context: &PermitContext) -> bool {
    if signature.owner != context.owner
        || signature.token_address != context.token_address
        || signature.spender != context.spender
        || signature.chain_id != context.chain_id
    {
        return false;
    }
    match context.nonce {
        Some(nonce) if signature.nonce == nonce => {}
        _ => return false,
    }
    if signature.deadline < context.transaction_deadline {
        return false;
    }
    if signature.permit_type == PermitType::Amount
        && signature.amount != Some(context.required_amount)
    {
        return false;
    }
    true
}

fn split_signature(raw: &[u8]) -> SwapResult<(u64, U256, U256)> {
    if raw.len() != 65 {
        return Err(SwapError::SignatureError(format!(
            "expected 65 signature bytes, got {}",
            raw.len()
        )));
    }
    let r = U256::from_big_endian(&raw[0..32]);
    let s = U256::from_big_endian(&raw[32..64]);
    let mut v = raw[64] as u64;
    if v < 27 {
        v += 27;
    }
    Ok((v, r, s))
}

fn typed_data_payload(info: &PermitInfo, context: &PermitContext, deadline: u64) -> Value {
    let nonce = context.nonce.unwrap_or_default();
    let mut domain_types = vec![
        json!({"name": "name", "type": "string"}),
    ];
    if info.version.is_some() {
        domain_types.push(json!({"name": "version", "type": "string"}));
    }
    domain_types.push(json!({"name": "chainId", "type": "uint256"}));
    domain_types.push(json!({"name": "verifyingContract", "type": "address"}));

    let mut domain = json!({
        "name": info.name,
        "chainId": context.chain_id,
        "verifyingContract": format!("{:?}", context.token_address),
    });
    if let Some(version) = info.version {
        domain["version"] = json!(version);
    }

    let (permit_types, message) = match info.permit_type {
        PermitType::Allowed => (
            json!([
                {"name": "holder", "type": "address"},
                {"name": "spender", "type": "address"},
                {"name": "nonce", "type": "uint256"},
                {"name": "expiry", "type": "uint256"},
                {"name": "allowed", "type": "bool"},
            ]),
            json!({
                "holder": format!("{:?}", context.owner),
                "spender": format!("{:?}", context.spender),
                "nonce": nonce.to_string(),
                "expiry": deadline.to_string(),
                "allowed": true,
            }),
        ),
        PermitType::Amount => (
            json!([
                {"name": "owner", "type": "address"},
                {"name": "spender", "type": "address"},
                {"name": "value", "type": "uint256"},
                {"name": "nonce", "type": "uint256"},
                {"name": "deadline", "type": "uint256"},
            ]),
            json!({
                "owner": format!("{:?}", context.owner),
                "spender": format!("{:?}", context.spender),
                "value": context.required_amount.to_string(),
                "nonce": nonce.to_string(),
                "deadline": deadline.to_string(),
            }),
        ),
    };

    json!({
        "types": {
            "EIP712Domain": domain_types,
            "Permit": permit_types,
        },
        "domain": domain,
        "primaryType": "Permit",
        "message": message,
    })
}

/// Off-chain approval flow. The captured signature is owned by this signer
/// instance (session scope) and re-validated against the live context on
/// every read; it is never shared module-wide.
pub struct PermitSigner<M> {
    client: std::sync::Arc<M>,
    signature: Option<SignatureData>,
}

impl<M: Middleware> PermitSigner<M> {
    pub fn new(client: std::sync::Arc<M>) -> Self {
        Self {
            client,
            signature: None,
        }
    }

    pub fn signature(&self) -> Option<&SignatureData> {
        self.signature.as_ref()
    }

    /// Current standing of the permit flow for this context.
    pub fn state(&self, context: &PermitContext) -> PermitState {
        if !context.wallet_supports_signing {
            return PermitState::NotApplicable;
        }
        if context.required_amount.is_zero() {
            return PermitState::NotApplicable;
        }
        if permit_info(
            context.chain_id,
            context.token_address,
            context.override_info.as_ref(),
        )
        .is_none()
        {
            return PermitState::NotApplicable;
        }
        if context.nonce.is_none() {
            return PermitState::Loading;
        }
        match &self.signature {
            Some(signature) if signature_matches(signature, context) => PermitState::Signed,
            _ => PermitState::NotSigned,
        }
    }

    /// Reads the owner's permit nonce from the token contract.
    pub async fn load_nonce(&self, token_address: Address, owner: Address) -> SwapResult<U256> {
        let result = abi::call_read(
            self.client.as_ref(),
            token_address,
            &abi::erc20_nonces(),
            &[Token::Address(owner)],
        )
        .await?;
        abi::as_uint(
            result
                .first()
                .ok_or_else(|| SwapError::AbiError("empty nonces result".to_string()))?,
        )
    }

    /// Builds the typed-data payload for the token's permit variant,
    /// requests an off-chain signature from the wallet provider, splits it
    /// and stores the result. The signed deadline extends past the
    /// transaction deadline by a fixed buffer so a merely slow submission
    /// does not force a re-sign.
    pub async fn gather_permit_signature(
        &mut self,
        context: &PermitContext,
    ) -> SwapResult<&SignatureData> {
        let info = permit_info(
            context.chain_id,
            context.token_address,
            context.override_info.as_ref(),
        )
        .ok_or_else(|| {
            SwapError::SignatureError("token is not permit-capable".to_string())
        })?;
        let nonce = context.nonce.ok_or_else(|| {
            SwapError::SignatureError("permit nonce not yet resolved".to_string())
        })?;

        let deadline = context.transaction_deadline + PERMIT_VALIDITY_BUFFER_SECS;
        let payload = typed_data_payload(&info, context, deadline);
        debug!(
            "Requesting typed-data signature for {:?} ({:?})",
            context.token_address, info.permit_type
        );

        let signature_hex: String = self
            .client
            .provider()
            .request(
                "eth_signTypedData_v4",
                [
                    Value::String(format!("{:?}", context.owner)),
                    Value::String(payload.to_string()),
                ],
            )
            .await
            .map_err(SwapError::provider)?;

        let raw = hex::decode(signature_hex.trim_start_matches("0x"))
            .map_err(|e| SwapError::SignatureError(e.to_string()))?;
        let (v, r, s) = split_signature(&raw)?;

        let amount = match info.permit_type {
            PermitType::Amount => Some(context.required_amount),
            PermitType::Allowed => None,
        };
        self.signature = Some(SignatureData {
            v,
            r,
            s,
            deadline,
            nonce,
            owner: context.owner,
            spender: context.spender,
            chain_id: context.chain_id,
            token_address: context.token_address,
            permit_type: info.permit_type,
            amount,
        });
        info!(
            "Captured permit signature for {:?}, valid until {}",
            context.token_address, deadline
        );
        Ok(self.signature.as_ref().expect("signature just stored"))
    }

    /// Drops the stored signature, forcing a fresh sign on next use.
    pub fn invalidate(&mut self) {
        self.signature = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::{Http, Provider};
    use std::sync::Arc;

    fn dai() -> Address {
        Address::from_str(DAI_ADDRESS).unwrap()
    }

    fn uni() -> Address {
        Address::from_str(UNI_ADDRESS).unwrap()
    }

    fn context(token_address: Address) -> PermitContext {
        PermitContext {
            owner: Address::from_low_u64_be(0xaa),
            token_address,
            spender: Address::from_low_u64_be(0xbb),
            chain_id: MAINNET_CHAIN_ID,
            required_amount: U256::from(1000u64),
            transaction_deadline: 1_700_000_000,
            nonce: Some(U256::from(7u64)),
            wallet_supports_signing: true,
            override_info: None,
        }
    }

    fn signature_for(context: &PermitContext, permit_type: PermitType) -> SignatureData {
        SignatureData {
            v: 27,
            r: U256::from(1u64),
            s: U256::from(2u64),
            deadline: context.transaction_deadline + PERMIT_VALIDITY_BUFFER_SECS,
            nonce: context.nonce.unwrap(),
            owner: context.owner,
            spender: context.spender,
            chain_id: context.chain_id,
            token_address: context.token_address,
            permit_type,
            amount: match permit_type {
                PermitType::Amount => Some(context.required_amount),
                PermitType::Allowed => None,
            },
        }
    }

    fn signer() -> PermitSigner<Provider<Http>> {
        let provider = Provider::<Http>::try_from("http://localhost:8545").unwrap();
        PermitSigner::new(Arc::new(provider))
    }

    #[test]
    fn test_allow_list_lookup() {
        assert!(permit_info(MAINNET_CHAIN_ID, dai(), None).is_some());
        assert!(permit_info(MAINNET_CHAIN_ID, uni(), None).is_some());
        assert!(permit_info(MAINNET_CHAIN_ID, Address::from_low_u64_be(1), None).is_none());
        assert!(permit_info(5, dai(), None).is_none());

        // an override descriptor enables tokens off the list
        let custom = PermitInfo {
            permit_type: PermitType::Amount,
            name: "Custom",
            version: Some("2"),
        };
        assert!(permit_info(5, dai(), Some(&custom)).is_some());
    }

    #[test]
    fn test_state_not_applicable() {
        let signer = signer();

        let mut ctx = context(dai());
        ctx.wallet_supports_signing = false;
        assert_eq!(signer.state(&ctx), PermitState::NotApplicable);

        // unlisted token without override
        let ctx = context(Address::from_low_u64_be(1));
        assert_eq!(signer.state(&ctx), PermitState::NotApplicable);

        // incomplete amount context
        let mut ctx = context(dai());
        ctx.required_amount = U256::zero();
        assert_eq!(signer.state(&ctx), PermitState::NotApplicable);
    }

    #[test]
    fn test_state_loading_until_nonce_resolves() {
        let signer = signer();
        let mut ctx = context(dai());
        ctx.nonce = None;
        assert_eq!(signer.state(&ctx), PermitState::Loading);
    }

    #[test]
    fn test_state_signed_and_context_drift() {
        let mut signer = signer();
        let ctx = context(uni());
        signer.signature = Some(signature_for(&ctx, PermitType::Amount));
        assert_eq!(signer.state(&ctx), PermitState::Signed);

        // owner drift
        let mut drift = ctx.clone();
        drift.owner = Address::from_low_u64_be(0xcc);
        assert_eq!(signer.state(&drift), PermitState::NotSigned);

        // token drift
        let mut drift = ctx.clone();
        drift.token_address = dai();
        assert_eq!(signer.state(&drift), PermitState::NotSigned);

        // nonce drift
        let mut drift = ctx.clone();
        drift.nonce = Some(U256::from(8u64));
        assert_eq!(signer.state(&drift), PermitState::NotSigned);

        // spender drift
        let mut drift = ctx.clone();
        drift.spender = Address::from_low_u64_be(0xdd);
        assert_eq!(signer.state(&drift), PermitState::NotSigned);

        // amount drift invalidates an amount-typed permit even though the
        // signature is still time-valid
        let mut drift = ctx.clone();
        drift.required_amount = U256::from(999u64);
        assert_eq!(signer.state(&drift), PermitState::NotSigned);

        // a later transaction deadline outlives the signed deadline
        let mut drift = ctx;
        drift.transaction_deadline += 2 * PERMIT_VALIDITY_BUFFER_SECS;
        assert_eq!(signer.state(&drift), PermitState::NotSigned);
    }

    #[test]
    fn test_allowed_style_ignores_amount_drift() {
        let mut signer = signer();
        let ctx = context(dai());
        signer.signature = Some(signature_for(&ctx, PermitType::Allowed));
        assert_eq!(signer.state(&ctx), PermitState::Signed);

        let mut drift = ctx;
        drift.required_amount = U256::from(999_999u64);
        assert_eq!(signer.state(&drift), PermitState::Signed);
    }

    #[test]
    fn test_split_signature() {
        let mut raw = vec![0u8; 65];
        raw[31] = 1; // r = 1
        raw[63] = 2; // s = 2
        raw[64] = 0; // v normalized to 27
        let (v, r, s) = split_signature(&raw).unwrap();
        assert_eq!(v, 27);
        assert_eq!(r, U256::from(1u64));
        assert_eq!(s, U256::from(2u64));

        raw[64] = 28;
        assert_eq!(split_signature(&raw).unwrap().0, 28);

        assert!(split_signature(&[0u8; 64]).is_err());
    }

    #[test]
    fn test_typed_data_shapes() {
        let ctx = context(dai());
        let info = permit_info(MAINNET_CHAIN_ID, dai(), None).unwrap();
        let payload = typed_data_payload(&info, &ctx, 1_700_001_200);

        // DAI: allowed-style message, domain with version
        assert_eq!(payload["domain"]["version"], "1");
        assert_eq!(payload["message"]["allowed"], true);
        assert_eq!(payload["message"]["holder"], format!("{:?}", ctx.owner));
        assert_eq!(payload["message"]["expiry"], "1700001200");

        let ctx = context(uni());
        let info = permit_info(MAINNET_CHAIN_ID, uni(), None).unwrap();
        let payload = typed_data_payload(&info, &ctx, 1_700_001_200);

        // UNI: amount-style message, no domain version
        assert!(payload["domain"].get("version").is_none());
        assert_eq!(payload["message"]["value"], "1000");
        assert_eq!(payload["message"]["deadline"], "1700001200");
        let domain_types = payload["types"]["EIP712Domain"].as_array().unwrap();
        assert_eq!(domain_types.len(), 3);
    }
}
