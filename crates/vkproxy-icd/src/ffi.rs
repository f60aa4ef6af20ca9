//! Helpers for raw pointer/count pairs crossing the C boundary.

use ash::vk;

use crate::error::IcdError;

/// View a pointer/count pair as a slice. A null pointer or zero count is empty.
///
/// # Safety
/// A non-null `ptr` must point to `count` initialized elements that outlive `'a`.
pub(crate) unsafe fn raw_slice<'a, T>(ptr: *const T, count: u32) -> &'a [T] {
    if ptr.is_null() || count == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, count as usize)
    }
}

/// Mutable counterpart of [`raw_slice`].
///
/// # Safety
/// A non-null `ptr` must point to `count` writable elements that outlive `'a`.
pub(crate) unsafe fn raw_slice_mut<'a, T>(ptr: *mut T, count: u32) -> &'a mut [T] {
    if ptr.is_null() || count == 0 {
        &mut []
    } else {
        std::slice::from_raw_parts_mut(ptr, count as usize)
    }
}

/// Answer a two-call enumeration from `items`.
///
/// With a null `p_items` only the count is written. Otherwise up to
/// `*p_count` items are copied, `*p_count` is set to the number copied, and
/// `INCOMPLETE` reports that the caller's buffer was too small.
///
/// # Safety
/// `p_count` must be valid for reads and writes. A non-null `p_items` must
/// have room for `*p_count` elements.
pub(crate) unsafe fn enumerate_into<T: Copy>(items: &[T], p_count: *mut u32, p_items: *mut T) -> vk::Result {
    if p_count.is_null() {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    }
    if p_items.is_null() {
        *p_count = items.len() as u32;
        return vk::Result::SUCCESS;
    }

    let capacity = *p_count as usize;
    let copied = capacity.min(items.len());
    std::ptr::copy_nonoverlapping(items.as_ptr(), p_items, copied);
    *p_count = copied as u32;

    if copied < items.len() {
        vk::Result::INCOMPLETE
    } else {
        vk::Result::SUCCESS
    }
}

/// Run a native two-call enumeration to completion.
///
/// Retries while the native side reports `INCOMPLETE`, which happens when
/// the list grows between the count and fill calls.
///
/// # Safety
/// `call` must follow the Vulkan two-call contract.
pub(crate) unsafe fn query_native<T: Copy + Default>(
    mut call: impl FnMut(*mut u32, *mut T) -> vk::Result,
) -> Result<Vec<T>, IcdError> {
    loop {
        let mut count = 0u32;
        let result = call(&mut count, std::ptr::null_mut());
        if result != vk::Result::SUCCESS {
            return Err(IcdError::Native(result));
        }

        let mut items = Vec::new();
        items.try_reserve_exact(count as usize)?;
        items.resize(count as usize, T::default());

        match call(&mut count, items.as_mut_ptr()) {
            vk::Result::SUCCESS => {
                items.truncate(count as usize);
                return Ok(items);
            }
            vk::Result::INCOMPLETE => continue,
            other => return Err(IcdError::Native(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_output_reports_count() {
        let items = [1u32, 2, 3];
        let mut count = 0;
        let result = unsafe { enumerate_into(&items, &mut count, std::ptr::null_mut()) };
        assert_eq!(result, vk::Result::SUCCESS);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_short_buffer_is_incomplete() {
        let items = [10u32, 20, 30];
        let mut out = [0u32; 2];
        let mut count = 2;
        let result = unsafe { enumerate_into(&items, &mut count, out.as_mut_ptr()) };
        assert_eq!(result, vk::Result::INCOMPLETE);
        assert_eq!(count, 2);
        assert_eq!(out, [10, 20]);
    }

    #[test]
    fn test_large_buffer_reports_copied() {
        let items = [7u32, 8];
        let mut out = [0u32; 5];
        let mut count = 5;
        let result = unsafe { enumerate_into(&items, &mut count, out.as_mut_ptr()) };
        assert_eq!(result, vk::Result::SUCCESS);
        assert_eq!(count, 2);
        assert_eq!(&out[..2], &[7, 8]);
    }

    #[test]
    fn test_empty_list() {
        let items: [u32; 0] = [];
        let mut out = [0u32; 1];
        let mut count = 1;
        let result = unsafe { enumerate_into(&items, &mut count, out.as_mut_ptr()) };
        assert_eq!(result, vk::Result::SUCCESS);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_query_native_retries_incomplete() {
        let mut calls = 0;
        let items = unsafe {
            query_native::<u32>(|p_count, p_items| {
                calls += 1;
                // The list grows from 1 to 2 after the first count query.
                let available: &[u32] = if calls == 1 { &[1] } else { &[1, 2] };
                enumerate_into(available, p_count, p_items)
            })
        }
        .unwrap();
        assert_eq!(items, vec![1, 2]);
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_raw_slice_null_is_empty() {
        let slice: &[u32] = unsafe { raw_slice(std::ptr::null(), 4) };
        assert!(slice.is_empty());
    }
}
