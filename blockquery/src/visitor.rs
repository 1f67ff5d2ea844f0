use num::PrimInt;

/// Receives document positions as a query produces them.
pub trait Visitor<T> {
    fn visit(&mut self, value: T);
}

/// Collects positions in visiting order.
impl<T> Visitor<T> for Vec<T> {
    fn visit(&mut self, value: T) {
        self.push(value);
    }
}

/// Tallies matches without storing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct Counter(usize);

impl Counter {
    pub fn count(&self) -> usize {
        self.0
    }
}

impl<T> Visitor<T> for Counter {
    fn visit(&mut self, _value: T) {
        self.0 += 1;
    }
}

/// Shifts every visited position by `base` before passing it on.
pub struct Offset<'a, V> {
    base: u64,
    inner: &'a mut V,
}

impl<'a, V> Offset<'a, V> {
    pub fn new(base: u64, inner: &'a mut V) -> Self {
        Self { base, inner }
    }
}

impl<'a, V: Visitor<u64>> Visitor<usize> for Offset<'a, V> {
    fn visit(&mut self, value: usize) {
        self.inner.visit(self.base + value as u64);
    }
}

/// Visit the positions of all set bits in `words`, lowest first. Bit `b` of
/// `words[i]` is position `i * W::BITS + b`.
pub fn visit_set_bits<W, V>(words: &[W], visitor: &mut V)
where
    W: PrimInt,
    V: Visitor<usize>,
{
    let width = W::zero().count_zeros() as usize;
    for (i, &word) in words.iter().enumerate() {
        let mut rest = word;
        while rest != W::zero() {
            let tz = rest.trailing_zeros() as usize;
            visitor.visit(i * width + tz);
            rest = rest & !(W::one() << tz);
        }
    }
}
