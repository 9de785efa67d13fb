//! Values as sequences.
//!
//! [`Value`] is what an expression evaluates to: the empty sequence, a single atomic
//! value, a single node, an integer range or a materialized extent. The node type is a
//! parameter; this crate never looks inside nodes.

use smallvec::SmallVec;

use crate::error::{Error, ErrorCode};
use crate::value::AtomicValue;
use crate::value::integer::IntegerValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Item<N> {
    Atomic(AtomicValue),
    Node(N),
}

impl<N> Item<N> {
    pub fn as_atomic(&self) -> Option<&AtomicValue> {
        match self {
            Item::Atomic(a) => Some(a),
            Item::Node(_) => None,
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Item::Node(_))
    }
}

impl<N> From<AtomicValue> for Item<N> {
    fn from(a: AtomicValue) -> Self {
        Item::Atomic(a)
    }
}

/// A sequence of items.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<N> {
    Empty,
    Atomic(AtomicValue),
    Node(N),
    /// The integers `start..=end`; never empty.
    Range { start: i64, end: i64 },
    /// Two or more items.
    Extent(SmallVec<[Item<N>; 4]>),
}

impl<N> Default for Value<N> {
    fn default() -> Self {
        Value::Empty
    }
}

impl<N: Clone> Value<N> {
    /// Collapse to the smallest representation.
    pub fn from_items(items: impl IntoIterator<Item = Item<N>>) -> Self {
        let mut items: SmallVec<[Item<N>; 4]> = items.into_iter().collect();
        match items.len() {
            0 => Value::Empty,
            1 => match items.pop() {
                Some(Item::Atomic(a)) => Value::Atomic(a),
                Some(Item::Node(n)) => Value::Node(n),
                None => Value::Empty,
            },
            _ => Value::Extent(items),
        }
    }

    /// The range `start to end`; empty when `start > end`.
    pub fn range(start: i64, end: i64) -> Self {
        match start.cmp(&end) {
            core::cmp::Ordering::Greater => Value::Empty,
            core::cmp::Ordering::Equal => Value::Atomic(AtomicValue::integer(start)),
            core::cmp::Ordering::Less => Value::Range { start, end },
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Value::Empty => 0,
            Value::Atomic(_) | Value::Node(_) => 1,
            Value::Range { start, end } => {
                usize::try_from(i128::from(*end) - i128::from(*start) + 1).unwrap_or(usize::MAX)
            }
            Value::Extent(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Item at zero-based position `n`.
    pub fn item_at(&self, n: usize) -> Option<Item<N>> {
        match self {
            Value::Empty => None,
            Value::Atomic(a) => (n == 0).then(|| Item::Atomic(a.clone())),
            Value::Node(node) => (n == 0).then(|| Item::Node(node.clone())),
            Value::Range { start, end } => {
                let v = start.checked_add(i64::try_from(n).ok()?)?;
                (v <= *end).then(|| Item::Atomic(AtomicValue::integer(IntegerValue::Int64(v))))
            }
            Value::Extent(items) => items.get(n).cloned(),
        }
    }

    pub fn iter(&self) -> ValueIter<'_, N> {
        ValueIter { value: self, pos: 0 }
    }

    /// Effective boolean value.
    ///
    /// Empty is false, a node first makes it true, a singleton atomic value follows the
    /// rules of [`AtomicValue::effective_boolean_value`]. Any other sequence of two or
    /// more items fails with `FORG0006`.
    pub fn effective_boolean_value(&self) -> Result<bool, Error> {
        match self {
            Value::Empty => Ok(false),
            Value::Node(_) => Ok(true),
            Value::Atomic(a) => a.effective_boolean_value(),
            Value::Extent(items) if items.first().is_some_and(Item::is_node) => Ok(true),
            Value::Range { .. } | Value::Extent(_) => Err(Error::from_code(
                ErrorCode::FORG0006,
                format!(
                    "effective boolean value is not defined for a sequence of {} atomic items",
                    self.len()
                ),
            )),
        }
    }
}

impl<N> From<AtomicValue> for Value<N> {
    fn from(a: AtomicValue) -> Self {
        Value::Atomic(a)
    }
}

impl<N> From<Option<AtomicValue>> for Value<N> {
    fn from(a: Option<AtomicValue>) -> Self {
        a.map_or(Value::Empty, Value::Atomic)
    }
}

impl<N: Clone> FromIterator<Item<N>> for Value<N> {
    fn from_iter<I: IntoIterator<Item = Item<N>>>(iter: I) -> Self {
        Value::from_items(iter)
    }
}

/// Iterator over the items of a [`Value`].
pub struct ValueIter<'a, N> {
    value: &'a Value<N>,
    pos: usize,
}

impl<N: Clone> Iterator for ValueIter<'_, N> {
    type Item = Item<N>;

    fn next(&mut self) -> Option<Item<N>> {
        let item = self.value.item_at(self.pos)?;
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.value.len().saturating_sub(self.pos);
        (rest, Some(rest))
    }
}

impl<'a, N: Clone> IntoIterator for &'a Value<N> {
    type Item = Item<N>;
    type IntoIter = ValueIter<'a, N>;

    fn into_iter(self) -> ValueIter<'a, N> {
        self.iter()
    }
}
