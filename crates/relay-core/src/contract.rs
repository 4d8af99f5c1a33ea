//! EIP-3009 token contract bindings.

use crate::CoreError;
use alloy::sol;
use alloy::sol_types::SolCall;
use relay_types::{Address, AuthorizationKind, AuthorizationMessage, Bytes, SignatureParts, B256};

sol! {
	/// Subset of the EIP-3009 interface used by the relay.
	interface IEIP3009 {
		function authorizationState(address authorizer, bytes32 nonce) external view returns (bool);

		function transferWithAuthorization(
			address from,
			address to,
			uint256 value,
			uint256 validAfter,
			uint256 validBefore,
			bytes32 nonce,
			uint8 v,
			bytes32 r,
			bytes32 s
		) external;

		function receiveWithAuthorization(
			address from,
			address to,
			uint256 value,
			uint256 validAfter,
			uint256 validBefore,
			bytes32 nonce,
			uint8 v,
			bytes32 r,
			bytes32 s
		) external;
	}
}

pub fn encode_authorization_state(authorizer: Address, nonce: B256) -> Bytes {
	IEIP3009::authorizationStateCall { authorizer, nonce }
		.abi_encode()
		.into()
}

pub fn decode_authorization_state(output: &[u8]) -> Result<bool, CoreError> {
	IEIP3009::authorizationStateCall::abi_decode_returns(output)
		.map_err(|e| CoreError::Abi(format!("authorizationState: {}", e)))
}

/// Calldata for the entry point selected by `kind`.
pub fn encode_execution(
	kind: AuthorizationKind,
	message: &AuthorizationMessage,
	signature: &SignatureParts,
) -> Bytes {
	let encoded = match kind {
		AuthorizationKind::Transfer => IEIP3009::transferWithAuthorizationCall {
			from: message.from,
			to: message.to,
			value: message.value,
			validAfter: message.valid_after,
			validBefore: message.valid_before,
			nonce: message.nonce,
			v: signature.v,
			r: signature.r,
			s: signature.s,
		}
		.abi_encode(),
		AuthorizationKind::Receive => IEIP3009::receiveWithAuthorizationCall {
			from: message.from,
			to: message.to,
			value: message.value,
			validAfter: message.valid_after,
			validBefore: message.valid_before,
			nonce: message.nonce,
			v: signature.v,
			r: signature.r,
			s: signature.s,
		}
		.abi_encode(),
	};
	encoded.into()
}
