use std::ffi::{c_char, CStr, CString};

/// Wraps a c string into a string, or an empty string if the provided c string was null.
/// Assumes the provided c string is null terminated.
pub(crate) unsafe fn wrap_c_str(s: *const c_char) -> String {
    if s.is_null() {
        String::default()
    } else {
        CStr::from_ptr(s).to_string_lossy().into_owned()
    }
}

/// Unwraps a slice of strings into a vec of raw c strings. The pointers are valid as long as `strings` is.
pub(crate) fn unwrap_to_raw_strings(strings: &[CString]) -> Vec<*const c_char> {
    strings.iter().map(|string| string.as_ptr()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_c_str_is_empty() {
        assert_eq!(unsafe { wrap_c_str(std::ptr::null()) }, "");
    }

    #[test]
    fn raw_strings_point_into_owned_strings() {
        let strings = vec![CString::new("VK_LAYER_KHRONOS_validation").unwrap()];
        let raw = unwrap_to_raw_strings(&strings);
        assert_eq!(raw.len(), 1);
        assert_eq!(unsafe { wrap_c_str(raw[0]) }, "VK_LAYER_KHRONOS_validation");
    }
}
