// Ledger and database identifiers shared by proof template fixtures.

pub const ISSUER_DID: &str = "M6Mbe3qx7vB4wpZF4sBRjt";
pub const QUALIFIED_ISSUER_DID: &str = "did:sov:M6Mbe3qx7vB4wpZF4sBRjt";
pub const OTHER_ISSUER_DID: &str = "Th7MpTaRZVRYnPiabds81Y";

pub const BANK_ACCOUNT_SCHEMA_ID: &str = "M6Mbe3qx7vB4wpZF4sBRjt:2:bank_account:1.0";
pub const BANK_ACCOUNT_SCHEMA_REF: &str = "5c1a8b7e-2f0d-4d8e-9c53-0c7f2d1b6a41";
pub const BANK_ACCOUNT_ATTRIBUTES: [&str; 3] = ["iban", "bic", "balance"];

pub const COMMERCIAL_REGISTER_SCHEMA_ID: &str =
    "Th7MpTaRZVRYnPiabds81Y:2:commercial_register:0.2";
pub const COMMERCIAL_REGISTER_SCHEMA_REF: &str = "a0f3c96e-7a55-4b65-8a0b-7d3c0f6b2e19";
pub const COMMERCIAL_REGISTER_ATTRIBUTES: [&str; 3] = ["name", "city", "secret1"];

pub const UNKNOWN_SCHEMA_REF: &str = "0b1e9d6c-3f7e-4f1a-bb2e-65a9f2c4d870";

pub const CONNECTION_ID: &str = "d1a4c0b2-6f32-4d4e-8c1f-3b4a2d9e7f10";

/// 2022-04-15T05:20:00.123Z
pub const FIXED_CLOCK_MILLIS: i64 = 1_650_000_000_123;
pub const FIXED_CLOCK_SECONDS: u64 = 1_650_000_000;
