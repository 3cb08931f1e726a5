//! Protocol error definitions.

use odra::prelude::*;

/// Basket protocol errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ProtocolError {
    // Validation errors (1xx)
    InvalidAmount = 100,
    ArrayLengthMismatch = 101,
    InvalidWeightsSum = 102,
    ZeroWeight = 103,
    ZeroPrice = 104,
    ExponentOutOfRange = 105,

    // Not-found errors (2xx)
    BasketDoesNotExist = 200,
    BasketTokenNotRegistered = 201,
    AssetPriceNotAvailable = 202,
    AssetNotRegistered = 203,
    AssetAlreadyRegistered = 204,

    // State errors (3xx)
    BasketNotActive = 300,
    InsufficientCollateral = 301,
    InsufficientDebt = 302,
    PositionNotLiquidatable = 303,
    NoDebtToLiquidate = 304,
    PriceNotSet = 305,
    StalePrice = 306,
    ReentrantCall = 307,

    // Authorization errors (4xx)
    Unauthorized = 400,
    NotBasketCreator = 401,
    NotAuthorizedLiquidator = 402,

    // Transfer errors (5xx)
    InsufficientPayment = 500,
    PaymentMismatch = 501,
    InsufficientTokenBalance = 502,
    InsufficientAllowance = 503,

    // Configuration errors (9xx)
    InvalidConfig = 900,
}

impl ProtocolError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Validation
            ProtocolError::InvalidAmount => "Amount must be greater than zero",
            ProtocolError::ArrayLengthMismatch => "Asset and weight arrays differ in length",
            ProtocolError::InvalidWeightsSum => "Basket weights must sum to 10000 bps",
            ProtocolError::ZeroWeight => "Basket weight must be greater than zero",
            ProtocolError::ZeroPrice => "Price must be greater than zero",
            ProtocolError::ExponentOutOfRange => "Feed exponent cannot be rescaled to 18 decimals",

            // Not found
            ProtocolError::BasketDoesNotExist => "Basket does not exist",
            ProtocolError::BasketTokenNotRegistered => "No token registered for basket",
            ProtocolError::AssetPriceNotAvailable => "Asset price not available",
            ProtocolError::AssetNotRegistered => "Asset not registered",
            ProtocolError::AssetAlreadyRegistered => "Asset already registered",

            // State
            ProtocolError::BasketNotActive => "Basket is not active for minting",
            ProtocolError::InsufficientCollateral => "Insufficient collateral",
            ProtocolError::InsufficientDebt => "Burn amount exceeds position debt",
            ProtocolError::PositionNotLiquidatable => "Position is not liquidatable",
            ProtocolError::NoDebtToLiquidate => "Position has no debt to liquidate",
            ProtocolError::PriceNotSet => "Settlement price not set",
            ProtocolError::StalePrice => "Feed price is older than the freshness window",
            ProtocolError::ReentrantCall => "Reentrant call rejected",

            // Authorization
            ProtocolError::Unauthorized => "Unauthorized: caller is not admin",
            ProtocolError::NotBasketCreator => "Unauthorized: caller is not the basket creator",
            ProtocolError::NotAuthorizedLiquidator => "Unauthorized: caller is not an approved liquidator",

            // Transfer
            ProtocolError::InsufficientPayment => "Attached payment below required amount",
            ProtocolError::PaymentMismatch => "Attached payment does not match amount",
            ProtocolError::InsufficientTokenBalance => "Insufficient token balance",
            ProtocolError::InsufficientAllowance => "Transfer amount exceeds allowance",

            // Config
            ProtocolError::InvalidConfig => "Invalid configuration parameter",
        }
    }
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<ProtocolError> for OdraError {
    fn from(error: ProtocolError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}
