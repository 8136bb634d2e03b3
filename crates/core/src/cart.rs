//! Carts
//!
//! The quantity mutator. A [`Cart`] holds at most one line per product; every line has a quantity
//! of at least one, and any change that would take a line to zero removes it instead.

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    lines::CartLine,
    quantity::{Quantity, QuantityError},
    totals::{CartTotals, TotalsError, compute_totals},
};

/// Errors raised by cart mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// No line exists for the product.
    #[error("cart has no line for this product")]
    LineNotFound,

    /// The line is priced in a different currency to the cart.
    #[error("line is priced in {0}, cart uses {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Two lines were supplied for the same product.
    #[error("cart already has a line for this product")]
    DuplicateLine,

    /// Wrapped quantity error.
    #[error(transparent)]
    Quantity(#[from] QuantityError),

    /// Wrapped totals error.
    #[error(transparent)]
    Totals(#[from] TotalsError),
}

/// Outcome of a relative quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// The line remains with the new quantity.
    Updated(Quantity),

    /// The change took the quantity to zero or below and the line was removed.
    Removed,
}

/// An ordered set of cart lines, keyed by product, in a single currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart<'a, P> {
    currency: &'a Currency,
    lines: Vec<CartLine<'a, P>>,
}

impl<'a, P: Copy + Eq> Cart<'a, P> {
    /// Create an empty cart.
    pub fn new(currency: &'a Currency) -> Self {
        Self {
            currency,
            lines: Vec::new(),
        }
    }

    /// Create a cart from existing lines.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`] when a line is priced in another currency.
    /// - [`CartError::DuplicateLine`] when two lines share a product.
    pub fn with_lines<I>(currency: &'a Currency, lines: I) -> Result<Self, CartError>
    where
        I: IntoIterator<Item = CartLine<'a, P>>,
    {
        let mut cart = Self::new(currency);

        for line in lines {
            cart.check_currency(&line)?;

            if cart.position(*line.product()).is_some() {
                return Err(CartError::DuplicateLine);
            }

            cart.lines.push(line);
        }

        Ok(cart)
    }

    /// Return the cart currency
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Return the lines in insertion order
    pub fn lines(&self) -> &[CartLine<'a, P>] {
        &self.lines
    }

    /// Return the line for a product, if any
    pub fn line(&self, product: P) -> Option<&CartLine<'a, P>> {
        self.lines.iter().find(|line| *line.product() == product)
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add a line, or add its quantity to the existing line for the same product.
    ///
    /// An existing line takes the incoming price and discount, so the cart always carries the most
    /// recent product snapshot.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`] when the line is priced in another currency.
    /// - [`CartError::Quantity`] when the combined quantity overflows.
    pub fn add_line(&mut self, line: CartLine<'a, P>) -> Result<Quantity, CartError> {
        self.check_currency(&line)?;

        let Some(existing) = self
            .lines
            .iter_mut()
            .find(|existing| existing.product() == line.product())
        else {
            let quantity = line.quantity();
            self.lines.push(line);

            return Ok(quantity);
        };

        let quantity = existing.quantity().checked_add(line.quantity())?;

        existing.set_quantity(quantity);
        existing.reprice(*line.unit_price(), line.discount());

        Ok(quantity)
    }

    /// Set the quantity of an existing line. Setting the current quantity again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] when the product has no line.
    pub fn set_quantity(&mut self, product: P, quantity: Quantity) -> Result<(), CartError> {
        self.line_mut(product)?.set_quantity(quantity);

        Ok(())
    }

    /// Apply a signed change to a line's quantity, removing the line if it reaches zero.
    ///
    /// # Errors
    ///
    /// - [`CartError::LineNotFound`] when the product has no line.
    /// - [`CartError::Quantity`] when the result overflows.
    pub fn adjust_quantity(&mut self, product: P, delta: i64) -> Result<Adjustment, CartError> {
        let index = self.position(product).ok_or(CartError::LineNotFound)?;
        let line = self.lines.get_mut(index).ok_or(CartError::LineNotFound)?;

        match line.quantity().adjust(delta)? {
            Some(quantity) => {
                line.set_quantity(quantity);

                Ok(Adjustment::Updated(quantity))
            }
            None => {
                self.lines.remove(index);

                Ok(Adjustment::Removed)
            }
        }
    }

    /// Add one unit to a line.
    ///
    /// # Errors
    ///
    /// See [`Cart::adjust_quantity`].
    pub fn increment(&mut self, product: P) -> Result<Adjustment, CartError> {
        self.adjust_quantity(product, 1)
    }

    /// Take one unit from a line. A line at quantity one is removed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] when the product has no line.
    pub fn decrement(&mut self, product: P) -> Result<Adjustment, CartError> {
        self.adjust_quantity(product, -1)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] when the product has no line.
    pub fn remove_line(&mut self, product: P) -> Result<CartLine<'a, P>, CartError> {
        let index = self.position(product).ok_or(CartError::LineNotFound)?;

        Ok(self.lines.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Merge other lines into this cart: quantities add for products already present, other
    /// lines are appended. Nothing is applied if any line fails.
    ///
    /// # Errors
    ///
    /// See [`Cart::add_line`].
    pub fn merge_lines<I>(&mut self, lines: I) -> Result<(), CartError>
    where
        I: IntoIterator<Item = CartLine<'a, P>>,
    {
        let mut merged = self.clone();

        for line in lines {
            merged.add_line(line)?;
        }

        *self = merged;

        Ok(())
    }

    /// Compute the totals for the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Totals`] when the totals overflow.
    pub fn totals(&self) -> Result<CartTotals<'a>, CartError> {
        Ok(compute_totals(&self.lines, self.currency)?)
    }

    /// Consume the cart, returning its lines.
    pub fn into_lines(self) -> Vec<CartLine<'a, P>> {
        self.lines
    }

    fn position(&self, product: P) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| *line.product() == product)
    }

    fn line_mut(&mut self, product: P) -> Result<&mut CartLine<'a, P>, CartError> {
        self.lines
            .iter_mut()
            .find(|line| *line.product() == product)
            .ok_or(CartError::LineNotFound)
    }

    fn check_currency(&self, line: &CartLine<'a, P>) -> Result<(), CartError> {
        if line.currency() == self.currency {
            return Ok(());
        }

        Err(CartError::CurrencyMismatch(
            line.currency().iso_alpha_code,
            self.currency.iso_alpha_code,
        ))
    }
}
