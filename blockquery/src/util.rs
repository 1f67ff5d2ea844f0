use std::ops::BitOr;

#[inline]
pub fn or_4<T: BitOr<T, Output=T> + Copy>(v: [T; 4]) -> T {
    or_2(or_4_to_2(v))
}

#[inline]
fn or_4_to_2<T: BitOr<T, Output=T> + Copy>(v: [T; 4]) -> [T; 2] {
    [v[0] | v[1], v[2] | v[3]]
}

#[inline]
fn or_2<T: BitOr<T, Output=T> + Copy>(v: [T; 2]) -> T {
    v[0] | v[1]
}

#[inline]
#[cold]
pub fn cold() {}

#[inline]
pub fn unlikely(b: bool) -> bool {
    if b { cold() }
    b
}
