//! Prediction market contract ABI
//!
//! Calls are ABI-encoded locally and sent as raw transactions so the
//! sequencer controls the nonce of every write.

use alloy::primitives::{Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use oracle_core::{
    NormalizedPrediction, OnChainPrediction, OracleError, OracleResult, Outcome, UserStats,
};

sol! {
    interface IPredictionMarket {
        function createPrediction(
            string calldata description,
            uint256 duration,
            uint256 minVotes,
            uint256 maxVotes,
            uint8 predictionType,
            uint8 optionsCount,
            string[] calldata tags
        ) external returns (uint256 predictionId);

        function finalizePrediction(uint256 predictionId, uint8 outcome) external;

        function getPredictionDetails(uint256 predictionId) external view returns (
            string memory description,
            uint256 duration,
            uint256 minVotes,
            uint256 maxVotes,
            uint8 predictionType,
            uint8 optionsCount,
            string[] memory tags,
            bool isFinalized,
            uint8 outcome
        );

        function getUserStats(address user) external view returns (
            uint256 totalVotes,
            uint256 correctVotes,
            uint256 reputation
        );
    }
}

/// A write against the prediction market contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    CreatePrediction(NormalizedPrediction),
    FinalizePrediction { prediction_id: u64, outcome: Outcome },
}

impl ContractCall {
    /// Contract method name, for logs and error context
    pub fn method(&self) -> &'static str {
        match self {
            ContractCall::CreatePrediction(_) => "createPrediction",
            ContractCall::FinalizePrediction { .. } => "finalizePrediction",
        }
    }

    /// ABI-encoded calldata
    pub fn calldata(&self) -> Bytes {
        match self {
            ContractCall::CreatePrediction(prediction) => IPredictionMarket::createPredictionCall {
                description: prediction.candidate.description.clone(),
                duration: U256::from(prediction.candidate.duration),
                minVotes: U256::from(prediction.policy.min_votes),
                maxVotes: U256::from(prediction.policy.max_votes),
                predictionType: prediction.policy.prediction_type,
                optionsCount: prediction.policy.options_count,
                tags: prediction.candidate.tags.clone(),
            }
            .abi_encode()
            .into(),
            ContractCall::FinalizePrediction {
                prediction_id,
                outcome,
            } => IPredictionMarket::finalizePredictionCall {
                predictionId: U256::from(*prediction_id),
                outcome: outcome.as_u8(),
            }
            .abi_encode()
            .into(),
        }
    }
}

pub(crate) fn prediction_details_calldata(prediction_id: u64) -> Bytes {
    IPredictionMarket::getPredictionDetailsCall {
        predictionId: U256::from(prediction_id),
    }
    .abi_encode()
    .into()
}

pub(crate) fn user_stats_calldata(user: alloy::primitives::Address) -> Bytes {
    IPredictionMarket::getUserStatsCall { user }.abi_encode().into()
}

pub(crate) fn decode_prediction_details(data: &[u8]) -> OracleResult<OnChainPrediction> {
    let details = IPredictionMarket::getPredictionDetailsCall::abi_decode_returns(data)
        .map_err(|e| OracleError::contract_read(format!("Failed to decode prediction: {}", e)))?;

    let outcome = if details.isFinalized {
        Some(
            Outcome::try_from(i64::from(details.outcome))
                .map_err(|e| OracleError::contract_read(e.to_string()))?,
        )
    } else {
        None
    };

    Ok(OnChainPrediction {
        description: details.description,
        duration: u256_to_u64(details.duration, "duration")?,
        min_votes: u256_to_u64(details.minVotes, "minVotes")?,
        max_votes: u256_to_u64(details.maxVotes, "maxVotes")?,
        prediction_type: details.predictionType,
        options_count: details.optionsCount,
        tags: details.tags,
        is_finalized: details.isFinalized,
        outcome,
    })
}

pub(crate) fn decode_user_stats(data: &[u8]) -> OracleResult<UserStats> {
    let stats = IPredictionMarket::getUserStatsCall::abi_decode_returns(data)
        .map_err(|e| OracleError::contract_read(format!("Failed to decode user stats: {}", e)))?;

    Ok(UserStats {
        total_votes: u256_to_u64(stats.totalVotes, "totalVotes")?,
        correct_votes: u256_to_u64(stats.correctVotes, "correctVotes")?,
        reputation: u256_to_u64(stats.reputation, "reputation")?,
    })
}

fn u256_to_u64(value: U256, field: &str) -> OracleResult<u64> {
    u64::try_from(value)
        .map_err(|_| OracleError::contract_read(format!("{} does not fit in u64: {}", field, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::{sol_data, SolType};
    use oracle_core::PredictionCandidate;

    fn prediction() -> NormalizedPrediction {
        PredictionCandidate {
            description: "Will it snow in Paris on Christmas?".to_string(),
            duration: 86_400,
            tags: vec!["weather".into(), "paris".into(), "holiday".into()],
        }
        .normalize()
    }

    #[test]
    fn test_create_prediction_calldata() {
        let data = ContractCall::CreatePrediction(prediction()).calldata();
        assert_eq!(&data[..4], IPredictionMarket::createPredictionCall::SELECTOR.as_slice());

        let decoded = IPredictionMarket::createPredictionCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.description, "Will it snow in Paris on Christmas?");
        assert_eq!(decoded.duration, U256::from(86_400u64));
        assert_eq!(decoded.minVotes, U256::from(1u64));
        assert_eq!(decoded.maxVotes, U256::from(1000u64));
        assert_eq!(decoded.predictionType, 0);
        assert_eq!(decoded.optionsCount, 2);
        assert_eq!(decoded.tags.len(), 3);
    }

    #[test]
    fn test_finalize_calldata_carries_verdict() {
        let call = ContractCall::FinalizePrediction {
            prediction_id: 42,
            outcome: Outcome::Yes,
        };
        assert_eq!(call.method(), "finalizePrediction");

        let decoded = IPredictionMarket::finalizePredictionCall::abi_decode(&call.calldata()).unwrap();
        assert_eq!(decoded.predictionId, U256::from(42u64));
        assert_eq!(decoded.outcome, 1);
    }

    #[test]
    fn test_decode_prediction_details() {
        let encoded = <(sol_data::String, sol_data::Uint<256>, sol_data::Uint<256>, sol_data::Uint<256>, sol_data::Uint<8>, sol_data::Uint<8>, sol_data::Array<sol_data::String>, sol_data::Bool, sol_data::Uint<8>) as SolType>::abi_encode_params(&(
            "Will it snow?".to_string(),
            U256::from(3600u64),
            U256::from(1u64),
            U256::from(1000u64),
            0u8,
            2u8,
            vec!["weather".to_string()],
            true,
            1u8,
        ));

        let prediction = decode_prediction_details(&encoded).unwrap();
        assert_eq!(prediction.description, "Will it snow?");
        assert_eq!(prediction.duration, 3600);
        assert!(prediction.is_finalized);
        assert_eq!(prediction.outcome, Some(Outcome::Yes));
    }

    #[test]
    fn test_unfinalized_prediction_has_no_outcome() {
        let encoded = <(sol_data::String, sol_data::Uint<256>, sol_data::Uint<256>, sol_data::Uint<256>, sol_data::Uint<8>, sol_data::Uint<8>, sol_data::Array<sol_data::String>, sol_data::Bool, sol_data::Uint<8>) as SolType>::abi_encode_params(&(
            "Open".to_string(),
            U256::from(60u64),
            U256::from(1u64),
            U256::from(1000u64),
            0u8,
            2u8,
            Vec::<String>::new(),
            false,
            0u8,
        ));

        assert_eq!(decode_prediction_details(&encoded).unwrap().outcome, None);
    }

    #[test]
    fn test_decode_garbage_is_contract_read_error() {
        assert!(matches!(
            decode_user_stats(&[0xde, 0xad]),
            Err(OracleError::ContractRead(_))
        ));
    }

    #[test]
    fn test_u256_overflow() {
        assert!(u256_to_u64(U256::MAX, "duration").is_err());
        assert_eq!(u256_to_u64(U256::from(7u64), "duration").unwrap(), 7);
    }
}
