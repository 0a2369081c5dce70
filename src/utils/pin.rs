use core::pin::Pin;

/// Project a pinned array or slice onto one of its elements.
///
/// Panics if `index` is out of bounds, like indexing does.
#[inline]
pub(crate) fn get_pin_mut<T>(slice: Pin<&mut [T]>, index: usize) -> Pin<&mut T> {
    // SAFETY: the element is never moved out of the slice, and the slice is
    // pinned, so the element is structurally pinned as well.
    unsafe { slice.map_unchecked_mut(|slice| &mut slice[index]) }
}

/// Project a pinned `Vec` onto one of its elements.
///
/// The `Vec` must never be grown or shrunk while pinned, which would move the
/// elements it holds.
#[inline]
pub(crate) fn get_pin_mut_from_vec<T>(vec: Pin<&mut Vec<T>>, index: usize) -> Pin<&mut T> {
    // SAFETY: callers never reallocate the vec after pinning it, so the
    // element address is stable for as long as the pin lives.
    unsafe { vec.map_unchecked_mut(|vec| &mut vec[index]) }
}
