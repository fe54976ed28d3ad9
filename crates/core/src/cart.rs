//! Cart lines and the ordered cart mirror.
//!
//! The mirror is the client-side copy of the remote cart. It holds at most one
//! line per product, every line quantity is at least one, and lines keep the
//! position of the product's first add.

use std::num::NonZeroU32;

use serde::Serialize;

use crate::types::{Price, Product, ProductId};

/// One product and the quantity held in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    product: Product,
    quantity: NonZeroU32,
}

impl CartLine {
    /// A new line holding a single unit of `product`.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            quantity: NonZeroU32::MIN,
        }
    }

    /// A line holding `quantity` units of `product`.
    #[must_use]
    pub const fn with_quantity(product: Product, quantity: NonZeroU32) -> Self {
        Self { product, quantity }
    }

    /// The product snapshot taken when the line was created.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Identity of the product on this line.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Units of the product in the cart (always at least one).
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.price.times(self.quantity())
    }
}

/// Ordered collection of cart lines.
///
/// Cloning a mirror yields an independent snapshot; the cart engine hands out
/// clones so readers never alias its live state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CartMirror {
    lines: Vec<CartLine>,
}

impl CartMirror {
    /// An empty mirror.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in first-add order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Iterate over lines in first-add order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartLine> {
        self.lines.iter()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    /// Whether a line exists for `product_id`.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Quantity held for `product_id`, if a line exists.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.get(product_id).map(CartLine::quantity)
    }

    /// Whether one more unit of `product_id` fits: the line is absent or below
    /// `u32::MAX`.
    #[must_use]
    pub fn can_add_one(&self, product_id: ProductId) -> bool {
        self.quantity_of(product_id).is_none_or(|quantity| quantity < u32::MAX)
    }

    /// Sum of all line quantities (the navigation badge count).
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Sum of line subtotals.
    ///
    /// `None` for an empty cart or when lines are priced in different
    /// currencies.
    #[must_use]
    pub fn subtotal(&self) -> Option<Price> {
        let mut lines = self.lines.iter().map(CartLine::subtotal);
        let first = lines.next()?;
        lines.try_fold(first, Price::checked_add)
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line for the product, or appends a new line
    /// with quantity one. Returns the line's new quantity, or `None` with the
    /// mirror unchanged when the line is already at `u32::MAX`.
    pub fn add_one(&mut self, product: &Product) -> Option<u32> {
        if self.contains(product.id) {
            return self.increment(product.id);
        }
        self.lines.push(CartLine::new(product.clone()));
        Some(NonZeroU32::MIN.get())
    }

    /// Add one unit to an existing line.
    ///
    /// Returns the new quantity, or `None` if the product has no line or the
    /// line is already at `u32::MAX` (left unchanged).
    pub fn increment(&mut self, product_id: ProductId) -> Option<u32> {
        let line = self.line_mut(product_id)?;
        line.quantity = line.quantity.checked_add(1)?;
        Some(line.quantity.get())
    }

    /// Take one unit off an existing line.
    ///
    /// A line that would reach zero is removed. Returns the remaining
    /// quantity (`0` when the line was removed), or `None` if the product has
    /// no line.
    pub fn decrement(&mut self, product_id: ProductId) -> Option<u32> {
        let index = self.position(product_id)?;
        let line = self.lines.get_mut(index)?;
        if let Some(remaining) = NonZeroU32::new(line.quantity.get() - 1) {
            line.quantity = remaining;
            return Some(remaining.get());
        }
        self.lines.remove(index);
        Some(0)
    }

    /// Remove the line for `product_id`, returning it.
    pub fn remove(&mut self, product_id: ProductId) -> Option<CartLine> {
        let index = self.position(product_id)?;
        Some(self.lines.remove(index))
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product_id() == product_id)
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
    }
}

/// Rebuild a mirror from known lines.
///
/// A later line for a product already collected replaces that line,
/// keeping the earlier position.
impl FromIterator<CartLine> for CartMirror {
    fn from_iter<I: IntoIterator<Item = CartLine>>(iter: I) -> Self {
        let mut mirror = Self::new();
        for line in iter {
            match mirror.line_mut(line.product_id()) {
                Some(existing) => *existing = line,
                None => mirror.lines.push(line),
            }
        }
        mirror
    }
}

impl<'a> IntoIterator for &'a CartMirror {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
