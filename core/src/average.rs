//! Midpoints of two adjacent order statistics.

/// Domain midpoint of two values.
///
/// Integer implementations never overflow: halves are taken first and the
/// remainders are summed separately. For operands of mixed sign the result
/// may sit one above the truncated mean (`-3` and `4` give `1`).
pub trait Average: Sized {
    fn average(&self, other: &Self) -> Self;
}

macro_rules! impl_int_average {
    ($($ty:ty),*$(,)?) => {$(
        impl Average for $ty {
            #[inline]
            fn average(&self, other: &Self) -> Self {
                int_mean(*self as i128, *other as i128) as $ty
            }
        }
    )*};
}

impl_int_average!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Average for i128 {
    #[inline]
    fn average(&self, other: &Self) -> Self {
        int_mean(*self, *other)
    }
}

impl Average for u128 {
    #[inline]
    fn average(&self, other: &Self) -> Self {
        self / 2 + other / 2 + (self % 2 + other % 2) / 2
    }
}

impl Average for f32 {
    #[inline]
    fn average(&self, other: &Self) -> Self {
        self / 2.0 + other / 2.0
    }
}

impl Average for f64 {
    #[inline]
    fn average(&self, other: &Self) -> Self {
        self / 2.0 + other / 2.0
    }
}

/// `a/2 + b/2 + (a%2 + b%2)/2`.
#[inline]
pub const fn int_mean(a: i128, b: i128) -> i128 {
    a / 2 + b / 2 + (a % 2 + b % 2) / 2
}

/// Midpoint of two points on a line, `a + (b - a) / 2`.
///
/// Used for timestamps where the sum of two points is meaningless. Falls
/// back to [`int_mean`] when the distance itself does not fit.
#[inline]
pub fn point_mean(a: i64, b: i64) -> i64 {
    match b.checked_sub(a) {
        Some(diff) => a + diff / 2,
        None => int_mean(a as i128, b as i128) as i64,
    }
}
