use std::convert::TryInto;

/// Copy the 4 bytes starting at `offset`, or `None` if `i` is too short
#[inline]
pub(crate) fn array_ref4(i: &[u8], offset: usize) -> Option<[u8; 4]> {
    i.get(offset..offset.checked_add(4)?)?.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::array_ref4;

    #[test]
    fn read_array4() {
        let data = [0, 1, 2, 3, 4, 5];
        assert_eq!(array_ref4(&data, 2), Some([2, 3, 4, 5]));
        assert_eq!(array_ref4(&data, 3), None);
        assert_eq!(array_ref4(&data, usize::MAX), None);
    }
}
