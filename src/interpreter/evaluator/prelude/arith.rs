use bigdecimal::BigDecimal;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{core::{EvalResult, Signal}, prelude::support::binary},
        value::{
            core::{Unit, Value},
            environment::EnvRef,
        },
    },
};

/// Installs `+ - * / ^ ^/` on the root environment.
pub fn install(env: &EnvRef) {
    env.define("+", binary("+", add));
    env.define("-", binary("-", subtract));
    env.define("*", binary("*", multiply));
    env.define("/", binary("/", divide));
    env.define("^", binary("^", power));
    env.define("^/", binary("^/", root));
}

/// Addition. Both operands must carry the same dimension; meters plus
/// seconds is a mistake, not a unit conversion.
fn add(left: Value, right: Value, _env: &EnvRef) -> EvalResult<Value> {
    let (a, b) = same_dimension(&left, &right)?;
    Ok(Value::Unit(Unit { magnitude: a.magnitude + b.magnitude,
                          dim:       a.dim, }))
}

/// Subtraction, under the same dimensional-equality rule as addition.
fn subtract(left: Value, right: Value, _env: &EnvRef) -> EvalResult<Value> {
    let (a, b) = same_dimension(&left, &right)?;
    Ok(Value::Unit(Unit { magnitude: a.magnitude - b.magnitude,
                          dim:       a.dim, }))
}

/// Multiplication. Exponent vectors add: meters times meters is area.
fn multiply(left: Value, right: Value, _env: &EnvRef) -> EvalResult<Value> {
    let a = left.as_unit()?;
    let b = right.as_unit()?;
    Ok(Value::Unit(Unit { magnitude: &a.magnitude * &b.magnitude,
                          dim:       a.dim.multiply(&b.dim), }))
}

/// Division. Exponent vectors subtract; a zero divisor is a domain error.
fn divide(left: Value, right: Value, _env: &EnvRef) -> EvalResult<Value> {
    let a = left.as_unit()?;
    let b = right.as_unit()?;
    if b.magnitude.is_zero() {
        return Err(RuntimeError::NotInDomain { value:       right.clone(),
                                               explanation: "division by zero".to_string(), }
                                             .into());
    }
    Ok(Value::Unit(Unit { magnitude: &a.magnitude / &b.magnitude,
                          dim:       a.dim.divide(&b.dim), }))
}

/// Exponentiation by a dimensionless integer.
///
/// The dimension scales with the exponent, so `(meters x) ^ 3` is a
/// volume. A negative exponent inverts, which needs a nonzero base.
fn power(left: Value, right: Value, _env: &EnvRef) -> EvalResult<Value> {
    let base = left.as_unit()?.clone();
    let n = integer_operand(&right, "exponent")?;
    let scale = small_exponent(&right, n)?;

    if n < 0 && base.magnitude.is_zero() {
        return Err(RuntimeError::NotInDomain { value:       left.clone(),
                                               explanation:
                                                   "zero cannot be raised to a negative power"
                                                       .to_string(), }
                                             .into());
    }

    Ok(Value::Unit(Unit { magnitude: decimal_power(&base.magnitude, n),
                          dim:       base.dim.power(scale), }))
}

/// The n-th root, `^/`. The index must be a positive dimensionless
/// integer; even roots of negative quantities stay out of the domain.
/// Dimensions root exactly because exponents are rational.
fn root(left: Value, right: Value, _env: &EnvRef) -> EvalResult<Value> {
    let base = left.as_unit()?.clone();
    let n = integer_operand(&right, "root index")?;
    if n <= 0 {
        return Err(RuntimeError::NotInDomain { value:       right.clone(),
                                               explanation:
                                                   "the root index must be positive".to_string(), }
                                             .into());
    }
    let scale = small_exponent(&right, n)?;

    if n % 2 == 0 && base.magnitude.is_negative() {
        return Err(RuntimeError::NotInDomain { value:       left.clone(),
                                               explanation:
                                                   "an even root of a negative quantity"
                                                       .to_string(), }
                                             .into());
    }

    Ok(Value::Unit(Unit { magnitude: decimal_root(&left, &base.magnitude, n)?,
                          dim:       base.dim.root(scale), }))
}

/// Extracts two quantities and insists their dimensions agree.
fn same_dimension(left: &Value, right: &Value) -> EvalResult<(Unit, Unit)> {
    let a = left.as_unit()?;
    let b = right.as_unit()?;
    if a.dim != b.dim {
        return Err(RuntimeError::DimensionMismatch { left:  a.dim,
                                                     right: b.dim, }
                                                   .into());
    }
    Ok((a.clone(), b.clone()))
}

/// Extracts a dimensionless integer operand, as `^` and `^/` require.
fn integer_operand(value: &Value, role: &str) -> EvalResult<i64> {
    let unit = value.as_unit()?;
    if !unit.dim.is_none() {
        return Err(not_in_domain(value, format!("the {role} must be dimensionless")));
    }
    if !unit.magnitude.is_integer() {
        return Err(not_in_domain(value, format!("the {role} must be an integer")));
    }
    unit.magnitude.to_i64()
                  .ok_or_else(|| not_in_domain(value, format!("the {role} is too large")))
}

/// Narrows an exponent to the range dimension scaling supports.
fn small_exponent(value: &Value, n: i64) -> EvalResult<i32> {
    i32::try_from(n).map_err(|_| not_in_domain(value, "the exponent is too large".into()))
}

fn not_in_domain(value: &Value, explanation: String) -> Signal {
    RuntimeError::NotInDomain { value: value.clone(),
                                explanation }.into()
}

/// Integer powers by binary exponentiation; exact for any magnitude.
fn decimal_power(base: &BigDecimal, n: i64) -> BigDecimal {
    let mut result = BigDecimal::one();
    let mut factor = base.clone();
    let mut remaining = n.unsigned_abs();
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = &result * &factor;
        }
        factor = &factor * &factor;
        remaining >>= 1;
    }

    if n < 0 {
        // The zero base was rejected before we got here.
        BigDecimal::one() / result
    } else {
        result
    }
}

/// N-th roots of magnitudes.
///
/// Square and cube roots are computed by the decimal library; higher
/// indices go through a guarded `f64` round-trip, which is the documented
/// precision trade-off for them.
fn decimal_root(operand: &Value, magnitude: &BigDecimal, n: i64) -> EvalResult<BigDecimal> {
    if n == 1 || magnitude.is_zero() {
        return Ok(magnitude.clone());
    }
    match n {
        2 => magnitude.sqrt()
                      .ok_or_else(|| not_in_domain(operand, "no real square root".into())),
        3 => Ok(magnitude.cbrt()),
        _ => {
            let approx =
                magnitude.to_f64().ok_or_else(|| {
                                      not_in_domain(operand,
                                                           "too large for an approximate root"
                                                               .into())
                                  })?;
            let root = if approx < 0.0 {
                -(-approx).powf(1.0 / n as f64)
            } else {
                approx.powf(1.0 / n as f64)
            };
            BigDecimal::from_f64(root).ok_or_else(|| {
                                          not_in_domain(operand, "no finite root".into())
                                      })
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::value::{dimension::Dimension, environment::Environment};

    fn dec(text: &str) -> Value {
        Value::Unit(Unit::dimensionless(text.parse().expect("decimal")))
    }

    fn meters(text: &str) -> Value {
        Value::Unit(Unit { magnitude: text.parse().expect("decimal"),
                           dim:       Dimension::length(), })
    }

    fn env() -> EnvRef {
        Environment::root()
    }

    #[test]
    fn addition_requires_equal_dimensions() {
        assert_eq!(add(dec("2"), dec("2"), &env()), Ok(dec("4")));
        assert_eq!(add(meters("1"), meters("2"), &env()), Ok(meters("3")));
        assert!(matches!(add(meters("1"), dec("2"), &env()),
                         Err(crate::interpreter::evaluator::core::Signal::Error(
                             RuntimeError::DimensionMismatch { .. }
                         ))));
    }

    #[test]
    fn multiplication_combines_dimensions() {
        let area = multiply(meters("3"), meters("4"), &env()).expect("multiplies");
        let unit = area.as_unit().expect("unit");
        assert_eq!(unit.magnitude, "12".parse::<BigDecimal>().expect("decimal"));
        assert_eq!(unit.dim, Dimension::length().power(2));
    }

    #[test]
    fn division_rejects_zero() {
        assert!(divide(dec("1"), dec("0"), &env()).is_err());
        let speed = divide(meters("6"), dec("2"), &env()).expect("divides");
        assert_eq!(speed.as_unit().expect("unit").dim, Dimension::length());
    }

    #[test]
    fn power_needs_a_dimensionless_integer() {
        assert_eq!(power(dec("2"), dec("10"), &env()), Ok(dec("1024")));
        assert_eq!(power(dec("2"), dec("-2"), &env()), Ok(dec("0.25")));
        assert!(power(dec("2"), dec("0.5"), &env()).is_err());
        assert!(power(dec("2"), meters("2"), &env()).is_err());
        assert!(power(dec("0"), dec("-1"), &env()).is_err());
    }

    #[test]
    fn powers_scale_dimensions() {
        let volume = power(meters("2"), dec("3"), &env()).expect("powers");
        assert_eq!(volume.as_unit().expect("unit").dim, Dimension::length().power(3));
    }

    #[test]
    fn roots_invert_powers_exactly_on_dimensions() {
        let side = root(meters("9"), dec("2"), &env());
        // m^(1/2) — an exact rational exponent, whatever the magnitude.
        assert_eq!(side.expect("roots").as_unit().expect("unit").dim,
                   Dimension::length().root(2));

        assert_eq!(root(dec("27"), dec("3"), &env()), Ok(dec("3")));
        assert!(root(dec("-4"), dec("2"), &env()).is_err());
        assert_eq!(root(dec("-27"), dec("3"), &env()), Ok(dec("-3")));
        assert!(root(dec("4"), dec("0"), &env()).is_err());
    }
}
