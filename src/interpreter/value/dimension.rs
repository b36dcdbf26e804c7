use num_rational::Ratio;
use num_traits::Zero;

/// An exact exponent over one SI base unit.
pub type Exponent = Ratio<i32>;

/// A vector of exponents over the seven SI base units.
///
/// Every numeric value carries one of these; a plain number is simply a
/// quantity whose exponents are all zero. Exponents are rationals so that
/// roots stay exact (`m^2` rooted twice is `m`, not `m^(2/2)`); `Ratio`
/// reduces on construction, so no exponent is ever stored unreduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    /// Time (seconds).
    pub time:        Exponent,
    /// Length (meters).
    pub length:      Exponent,
    /// Mass (kilograms).
    pub mass:        Exponent,
    /// Electric current (amperes).
    pub current:     Exponent,
    /// Thermodynamic temperature (kelvin).
    pub temperature: Exponent,
    /// Amount of substance (moles).
    pub amount:      Exponent,
    /// Luminous intensity (candela).
    pub luminosity:  Exponent,
}

impl Default for Dimension {
    fn default() -> Self {
        Self { time:        Exponent::zero(),
               length:      Exponent::zero(),
               mass:        Exponent::zero(),
               current:     Exponent::zero(),
               temperature: Exponent::zero(),
               amount:      Exponent::zero(),
               luminosity:  Exponent::zero(), }
    }
}

impl Dimension {
    /// The dimension of a plain number.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// True when every exponent is zero.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.exponents().iter().all(|(_, exponent)| exponent.is_zero())
    }

    /// Time to the first power.
    #[must_use]
    pub fn time() -> Self {
        Self { time: Exponent::from_integer(1),
               ..Self::default() }
    }

    /// Length to the first power.
    #[must_use]
    pub fn length() -> Self {
        Self { length: Exponent::from_integer(1),
               ..Self::default() }
    }

    /// Mass to the first power.
    #[must_use]
    pub fn mass() -> Self {
        Self { mass: Exponent::from_integer(1),
               ..Self::default() }
    }

    /// Current to the first power.
    #[must_use]
    pub fn current() -> Self {
        Self { current: Exponent::from_integer(1),
               ..Self::default() }
    }

    /// Temperature to the first power.
    #[must_use]
    pub fn temperature() -> Self {
        Self { temperature: Exponent::from_integer(1),
               ..Self::default() }
    }

    /// Amount of substance to the first power.
    #[must_use]
    pub fn amount() -> Self {
        Self { amount: Exponent::from_integer(1),
               ..Self::default() }
    }

    /// Luminous intensity to the first power.
    #[must_use]
    pub fn luminosity() -> Self {
        Self { luminosity: Exponent::from_integer(1),
               ..Self::default() }
    }

    /// The dimension of a product: exponents add.
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a + b)
    }

    /// The dimension of a quotient: exponents subtract.
    #[must_use]
    pub fn divide(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a - b)
    }

    /// The dimension of an integer power: exponents scale.
    #[must_use]
    pub fn power(&self, n: i32) -> Self {
        self.map(|exponent| exponent * Exponent::from_integer(n))
    }

    /// The dimension of an n-th root: exponents divide, exactly.
    ///
    /// `n` must be nonzero; the arithmetic prelude checks that before
    /// calling.
    #[must_use]
    pub fn root(&self, n: i32) -> Self {
        self.map(|exponent| exponent / Exponent::from_integer(n))
    }

    /// Renders the dimension for error messages, naming the dimensionless
    /// case explicitly.
    #[must_use]
    pub fn describe(&self) -> String {
        if self.is_none() {
            "dimensionless".to_string()
        } else {
            self.to_string()
        }
    }

    fn exponents(&self) -> [(&'static str, Exponent); 7] {
        [("m", self.length),
         ("kg", self.mass),
         ("s", self.time),
         ("A", self.current),
         ("K", self.temperature),
         ("mol", self.amount),
         ("cd", self.luminosity)]
    }

    fn combine(&self, other: &Self, f: impl Fn(Exponent, Exponent) -> Exponent) -> Self {
        Self { time:        f(self.time, other.time),
               length:      f(self.length, other.length),
               mass:        f(self.mass, other.mass),
               current:     f(self.current, other.current),
               temperature: f(self.temperature, other.temperature),
               amount:      f(self.amount, other.amount),
               luminosity:  f(self.luminosity, other.luminosity), }
    }

    fn map(&self, f: impl Fn(Exponent) -> Exponent) -> Self {
        self.combine(&Self::default(), |a, _| f(a))
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (symbol, exponent) in self.exponents() {
            if exponent.is_zero() {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            first = false;
            if exponent == Exponent::from_integer(1) {
                write!(f, "{symbol}")?;
            } else {
                write!(f, "{symbol}^{exponent}")?;
            }
        }
        Ok(())
    }
}
