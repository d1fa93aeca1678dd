use std::ops::Bound;

///
/// ColumnRange
///
/// Raw column-key envelope for one range read. Bounds are byte strings
/// compared lexicographically, exactly as the store orders columns.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnRange {
    pub lower: Bound<Vec<u8>>,
    pub upper: Bound<Vec<u8>>,
}

impl ColumnRange {
    #[must_use]
    pub const fn new(lower: Bound<Vec<u8>>, upper: Bound<Vec<u8>>) -> Self {
        Self { lower, upper }
    }

    /// Every column of the row.
    #[must_use]
    pub const fn all() -> Self {
        Self::new(Bound::Unbounded, Bound::Unbounded)
    }

    /// Exactly one column key.
    #[must_use]
    pub fn single(key: impl Into<Vec<u8>>) -> Self {
        let key = key.into();
        Self::new(Bound::Included(key.clone()), Bound::Included(key))
    }

    /// Half-open `[lower, upper)`.
    #[must_use]
    pub const fn half_open(lower: Vec<u8>, upper: Vec<u8>) -> Self {
        Self::new(Bound::Included(lower), Bound::Excluded(upper))
    }

    #[must_use]
    pub fn contains(&self, key: &[u8]) -> bool {
        let lower_ok = match &self.lower {
            Bound::Unbounded => true,
            Bound::Included(boundary) => key >= boundary.as_slice(),
            Bound::Excluded(boundary) => key > boundary.as_slice(),
        };
        let upper_ok = match &self.upper {
            Bound::Unbounded => true,
            Bound::Included(boundary) => key <= boundary.as_slice(),
            Bound::Excluded(boundary) => key < boundary.as_slice(),
        };

        lower_ok && upper_ok
    }

    /// True when no key can fall inside the envelope.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        // Unbounded envelopes are never empty by construction.
        let (Some(lower_key), Some(upper_key)) =
            (bound_key_ref(&self.lower), bound_key_ref(&self.upper))
        else {
            return false;
        };

        if lower_key < upper_key {
            return false;
        }
        if lower_key > upper_key {
            return true;
        }

        !matches!(self.lower, Bound::Included(_)) || !matches!(self.upper, Bound::Included(_))
    }

    /// Raise the lower bound to `bound` if it is tighter.
    #[must_use]
    pub fn narrow_lower(mut self, bound: Bound<Vec<u8>>) -> Self {
        if lower_is_tighter(&bound, &self.lower) {
            self.lower = bound;
        }
        self
    }

    /// Drop the upper bound to `bound` if it is tighter.
    #[must_use]
    pub fn narrow_upper(mut self, bound: Bound<Vec<u8>>) -> Self {
        if upper_is_tighter(&bound, &self.upper) {
            self.upper = bound;
        }
        self
    }

    #[must_use]
    pub(crate) fn as_bounds(&self) -> (Bound<&[u8]>, Bound<&[u8]>) {
        (as_slice_bound(&self.lower), as_slice_bound(&self.upper))
    }
}

fn bound_key_ref(bound: &Bound<Vec<u8>>) -> Option<&[u8]> {
    match bound {
        Bound::Included(value) | Bound::Excluded(value) => Some(value.as_slice()),
        Bound::Unbounded => None,
    }
}

fn as_slice_bound(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(value) => Bound::Included(value.as_slice()),
        Bound::Excluded(value) => Bound::Excluded(value.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

// On equal keys an exclusive bound is the tighter one on either side.
fn lower_is_tighter(candidate: &Bound<Vec<u8>>, current: &Bound<Vec<u8>>) -> bool {
    match (bound_key_ref(candidate), bound_key_ref(current)) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(a), Some(b)) => {
            a > b || (a == b && matches!(candidate, Bound::Excluded(_)))
        }
    }
}

fn upper_is_tighter(candidate: &Bound<Vec<u8>>, current: &Bound<Vec<u8>>) -> bool {
    match (bound_key_ref(candidate), bound_key_ref(current)) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(a), Some(b)) => {
            a < b || (a == b && matches!(candidate, Bound::Excluded(_)))
        }
    }
}
