use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::typed;
use crate::domain::{
    registry::ToolHandler,
    schema::{SchemaObject, ToolDescriptor},
    utils::{float_value, Numeric},
};
use crate::errors::ToolError;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OperandArgs {
    pub a: Numeric,
    pub b: Numeric,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PowerArgs {
    pub base: Numeric,
    pub exponent: Numeric,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SqrtArgs {
    pub number: Numeric,
}

fn operand_schema() -> SchemaObject {
    SchemaObject::object()
        .property("a", SchemaObject::number("First number"))
        .property("b", SchemaObject::number("Second number"))
        .required(&["a", "b"])
}

pub fn tools() -> Vec<Arc<dyn ToolHandler>> {
    vec![
        typed(
            ToolDescriptor::new("add", "Add two numbers together", operand_schema()),
            add,
        ),
        typed(
            ToolDescriptor::new(
                "subtract",
                "Subtract second number from first number",
                operand_schema(),
            ),
            subtract,
        ),
        typed(
            ToolDescriptor::new("multiply", "Multiply two numbers", operand_schema()),
            multiply,
        ),
        typed(
            ToolDescriptor::new(
                "divide",
                "Divide first number by second number",
                operand_schema(),
            ),
            divide,
        ),
        typed(
            ToolDescriptor::new(
                "power",
                "Raise first number to the power of second number",
                SchemaObject::object()
                    .property("base", SchemaObject::number("Base number"))
                    .property("exponent", SchemaObject::number("Exponent"))
                    .required(&["base", "exponent"]),
            ),
            power,
        ),
        typed(
            ToolDescriptor::new(
                "sqrt",
                "Calculate square root of a number",
                SchemaObject::object()
                    .property(
                        "number",
                        SchemaObject::number("Number to calculate square root of"),
                    )
                    .required(&["number"]),
            ),
            sqrt,
        ),
    ]
}

async fn add(args: OperandArgs) -> Result<Value, ToolError> {
    args.a.add(args.b).into_value()
}

async fn subtract(args: OperandArgs) -> Result<Value, ToolError> {
    args.a.sub(args.b).into_value()
}

async fn multiply(args: OperandArgs) -> Result<Value, ToolError> {
    args.a.mul(args.b).into_value()
}

async fn divide(args: OperandArgs) -> Result<Value, ToolError> {
    if args.b.is_zero() {
        return Err(ToolError::domain("Division by zero is not allowed"));
    }

    float_value(args.a.as_f64() / args.b.as_f64())
}

async fn power(args: PowerArgs) -> Result<Value, ToolError> {
    args.base.pow(args.exponent).into_value()
}

async fn sqrt(args: SqrtArgs) -> Result<Value, ToolError> {
    let number = args.number.as_f64();
    if number < 0.0 {
        return Err(ToolError::domain(
            "Cannot calculate square root of negative number",
        ));
    }

    float_value(number.sqrt())
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
    async fn integer_arithmetic_keeps_integers() {
        assert_eq!(call("add", json!({"a": 2, "b": 3})).await, Ok(json!(5)));
        assert_eq!(call("subtract", json!({"a": 2, "b": 3})).await, Ok(json!(-1)));
        assert_eq!(call("multiply", json!({"a": 4, "b": 3})).await, Ok(json!(12)));
        assert_eq!(call("power", json!({"base": 2, "exponent": 8})).await, Ok(json!(256)));
    }

    #[tokio::test]
    async fn float_arithmetic() {
        assert_eq!(call("add", json!({"a": 0.5, "b": 2})).await, Ok(json!(2.5)));
        assert_eq!(
            call("power", json!({"base": 9, "exponent": 0.5})).await,
            Ok(json!(3.0))
        );
    }

    #[tokio::test]
    async fn missing_operands_default_to_zero() {
        assert_eq!(call("add", json!({})).await, Ok(json!(0)));
        assert_eq!(call("multiply", json!({"a": 7})).await, Ok(json!(0)));
    }

    #[tokio::test]
    async fn divide_returns_float() {
        assert_eq!(call("divide", json!({"a": 6, "b": 3})).await, Ok(json!(2.0)));
        assert_eq!(call("divide", json!({"a": 1, "b": 4})).await, Ok(json!(0.25)));
    }

    #[tokio::test]
    async fn divide_by_zero_fails_for_int_and_float_divisors() {
        for a in [json!(0), json!(1), json!(-7.5), json!(1e300)] {
            for b in [json!(0), json!(0.0), json!(-0.0)] {
                let err = call("divide", json!({"a": a, "b": b}))
                    .await
                    .expect_err("division by zero must fail");
                assert_eq!(err, ToolError::domain("Division by zero is not allowed"));
            }
        }
    }

    #[tokio::test]
    async fn missing_divisor_is_division_by_zero() {
        let err = call("divide", json!({"a": 1}))
            .await
            .expect_err("default divisor is zero");
        assert!(matches!(err, ToolError::Domain(_)));
    }

    #[tokio::test]
    async fn sqrt_rejects_negative_input() {
        for number in [json!(-1), json!(-0.0001), json!(-1e10)] {
            let err = call("sqrt", json!({ "number": number }))
                .await
                .expect_err("negative radicand must fail");
            assert_eq!(
                err,
                ToolError::domain("Cannot calculate square root of negative number")
            );
        }
    }

    #[tokio::test]
    async fn sqrt_squares_back_to_input() {
        for number in [0.0, 1.0, 2.0, 10.5, 1e6, 123_456.789] {
            let value = call("sqrt", json!({ "number": number }))
                .await
                .expect("non-negative radicand succeeds");
            let root = value.as_f64().expect("float result");
            assert!((root * root - number).abs() <= 1e-9 * number.max(1.0));
        }
    }

    #[tokio::test]
    async fn overflowing_float_power_is_an_error() {
        let err = call("power", json!({"base": 10.0, "exponent": 400}))
            .await
            .expect_err("infinite result must fail");
        assert!(matches!(err, ToolError::Domain(_)));
    }
}
