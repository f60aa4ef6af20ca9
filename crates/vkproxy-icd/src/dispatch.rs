//! Dispatchable handle wrappers for the Vulkan ICD.
//!
//! The Vulkan loader requires that dispatchable handles (VkInstance,
//! VkPhysicalDevice, VkDevice, VkQueue, VkCommandBuffer) point at memory
//! whose first pointer-sized word it may overwrite with its own dispatch
//! table. Every wrapper here is `#[repr(C)]` and starts with a
//! [`LoaderHeader`], and the handle given to the application is the
//! wrapper's address.

use ash::vk::Handle;

/// The ICD loader magic value. The loader expects this in new dispatchable handles.
pub const ICD_LOADER_MAGIC: usize = 0x01CD_C0DE;

#[repr(C)]
#[derive(Debug)]
pub struct LoaderHeader {
    /// Owned by the loader once the handle is returned.
    loader_data: usize,
}

impl LoaderHeader {
    pub const fn new() -> Self {
        Self {
            loader_data: ICD_LOADER_MAGIC,
        }
    }
}

impl Default for LoaderHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the loader word at the start of a dispatchable handle.
///
/// # Safety
/// `handle` must be a live dispatchable handle created by this driver.
pub unsafe fn loader_data<H: Handle>(handle: H) -> usize {
    (handle.as_raw() as usize as *const usize).read_volatile()
}

/// A wrapper whose address doubles as an application-visible handle.
///
/// # Safety
/// Implementors must be `#[repr(C)]` with a [`LoaderHeader`] at offset zero.
/// Use the `dispatchable!` macro rather than implementing this by hand.
pub unsafe trait Dispatchable: Sized {
    type Handle: Handle + Copy;

    /// Hand ownership to the application.
    fn into_handle(self: Box<Self>) -> Self::Handle {
        Self::Handle::from_raw(Box::into_raw(self) as usize as u64)
    }

    /// The handle of a wrapper that lives in a `Box`.
    fn handle(&self) -> Self::Handle {
        Self::Handle::from_raw(self as *const Self as usize as u64)
    }

    /// Borrow the wrapper behind a handle.
    ///
    /// # Safety
    /// `handle` must be null or a live handle of this wrapper type.
    unsafe fn from_handle<'a>(handle: Self::Handle) -> Option<&'a Self> {
        (handle.as_raw() as usize as *const Self).as_ref()
    }

    /// Take ownership back from the application.
    ///
    /// # Safety
    /// `handle` must be null or a handle produced by [`Dispatchable::into_handle`]
    /// that has not been reclaimed yet.
    unsafe fn reclaim(handle: Self::Handle) -> Option<Box<Self>> {
        let ptr = handle.as_raw() as usize as *mut Self;
        if ptr.is_null() {
            None
        } else {
            Some(Box::from_raw(ptr))
        }
    }
}

macro_rules! dispatchable {
    ($wrapper:ty => $handle:ty) => {
        const _: () = assert!(::std::mem::offset_of!($wrapper, header) == 0);

        unsafe impl $crate::dispatch::Dispatchable for $wrapper {
            type Handle = $handle;
        }
    };
}
pub(crate) use dispatchable;
