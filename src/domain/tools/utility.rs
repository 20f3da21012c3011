use std::sync::Arc;

use md5::Md5;
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{
    basic::{text_schema, NoArgs, TextArgs},
    typed,
};
use crate::domain::{
    registry::ToolHandler,
    schema::{SchemaObject, ToolDescriptor},
    utils::Numeric,
};
use crate::errors::ToolError;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RangeArgs {
    pub min: Numeric,
    pub max: Numeric,
}

impl Default for RangeArgs {
    fn default() -> Self {
        Self {
            min: Numeric::Int(0),
            max: Numeric::Int(100),
        }
    }
}

pub fn tools() -> Vec<Arc<dyn ToolHandler>> {
    vec![
        typed(
            ToolDescriptor::new(
                "random_number",
                "Generate a random number between min and max",
                SchemaObject::object()
                    .property("min", SchemaObject::number("Minimum value"))
                    .property("max", SchemaObject::number("Maximum value"))
                    .required(&["min", "max"]),
            ),
            random_number,
        ),
        typed(
            ToolDescriptor::new(
                "generate_uuid",
                "Generate a random UUID",
                SchemaObject::object(),
            ),
            generate_uuid,
        ),
        typed(
            ToolDescriptor::new(
                "hash_md5",
                "Generate MD5 hash of input text",
                text_schema("Text to hash"),
            ),
            hash_md5,
        ),
        typed(
            ToolDescriptor::new(
                "hash_sha256",
                "Generate SHA256 hash of input text",
                text_schema("Text to hash"),
            ),
            hash_sha256,
        ),
    ]
}

/// Inclusive integer range; fractional bounds are truncated after the order check.
async fn random_number(args: RangeArgs) -> Result<Value, ToolError> {
    if args.min.as_f64() > args.max.as_f64() {
        return Err(ToolError::domain(
            "Minimum value cannot be greater than maximum value",
        ));
    }

    let (min, max) = (args.min.truncate(), args.max.truncate());
    Ok(Value::from(rand::thread_rng().gen_range(min..=max)))
}

async fn generate_uuid(_: NoArgs) -> Result<Value, ToolError> {
    Ok(Value::String(Uuid::new_v4().to_string()))
}

async fn hash_md5(args: TextArgs) -> Result<Value, ToolError> {
    Ok(Value::String(hex::encode(Md5::digest(args.text.as_bytes()))))
}

async fn hash_sha256(args: TextArgs) -> Result<Value, ToolError> {
    Ok(Value::String(hex::encode(Sha256::digest(args.text.as_bytes()))))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::tools::invoke;

    async fn call(name: &str, args: Value) -> Result<Value, ToolError> {
        invoke(tools(), name, args).await
    }

    #[tokio::test]
    async fn random_number_rejects_inverted_range() {
        for (min, max) in [(1, 0), (100, -100), (5, 4)] {
            let err = call("random_number", json!({"min": min, "max": max}))
                .await
                .expect_err("inverted range must fail");
            assert_eq!(
                err,
                ToolError::domain("Minimum value cannot be greater than maximum value")
            );
        }

        let err = call("random_number", json!({"min": 1.5, "max": 1.2}))
            .await
            .expect_err("inverted float range must fail");
        assert!(matches!(err, ToolError::Domain(_)));
    }

    #[tokio::test]
    async fn random_number_stays_within_inclusive_bounds() {
        for (min, max) in [(0, 0), (-3, 3), (10, 11), (i64::MIN, i64::MAX)] {
            for _ in 0..50 {
                let value = call("random_number", json!({"min": min, "max": max}))
                    .await
                    .expect("valid range succeeds");
                let n = value.as_i64().expect("integer result");
                assert!(min <= n && n <= max);
            }
        }
    }

    #[tokio::test]
    async fn random_number_defaults_to_zero_through_hundred() {
        let value = call("random_number", json!({}))
            .await
            .expect("defaults are a valid range");
        let n = value.as_i64().expect("integer result");
        assert!((0..=100).contains(&n));
    }

    #[tokio::test]
    async fn generate_uuid_is_v4() {
        let value = call("generate_uuid", json!({})).await.expect("uuid");
        let parsed = Uuid::parse_str(value.as_str().expect("uuid string")).expect("valid uuid");
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[tokio::test]
    async fn hashes_are_known_hex_digests() {
        assert_eq!(
            call("hash_md5", json!({"text": "hello"})).await,
            Ok(json!("5d41402abc4b2a76b9719d911017c592"))
        );
        assert_eq!(
            call("hash_sha256", json!({"text": "hello"})).await,
            Ok(json!(
                "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
            ))
        );
    }

    #[tokio::test]
    async fn sha256_is_deterministic_and_input_sensitive() {
        let first = call("hash_sha256", json!({"text": "abc"})).await.expect("hash");
        let second = call("hash_sha256", json!({"text": "abc"})).await.expect("hash");
        let other = call("hash_sha256", json!({"text": "abd"})).await.expect("hash");

        assert_eq!(first, second);
        assert_ne!(first, other);
        let digest = first.as_str().expect("hex string");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
